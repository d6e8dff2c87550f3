use crate::db::repositories::attribute::{IngredientRepository, TagRepository};
use crate::entities::{prelude::*, recipe_ingredients, recipe_tags, recipes};
use crate::models::{Price, Recipe, RecipeChanges, RecipeDraft, RecipeFilter};
use anyhow::{Context, Result};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

pub struct RecipeRepository {
    conn: DatabaseConnection,
}

impl RecipeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Attaches tags and ingredients to each row, preserving row order.
    async fn hydrate<C: ConnectionTrait>(
        conn: &C,
        rows: Vec<recipes::Model>,
    ) -> Result<Vec<Recipe>> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut tags = TagRepository::linked_to(conn, &ids).await?;
        let mut ingredients = IngredientRepository::linked_to(conn, &ids).await?;

        rows.into_iter()
            .map(|model| {
                let price = Price::from_cents(model.price_cents)
                    .with_context(|| format!("Stored price of recipe {} is invalid", model.id))?;

                Ok(Recipe {
                    id: model.id,
                    user_id: model.user_id,
                    tags: tags.remove(&model.id).unwrap_or_default(),
                    ingredients: ingredients.remove(&model.id).unwrap_or_default(),
                    title: model.title,
                    time_minutes: model.time_minutes,
                    price,
                    link: model.link,
                    description: model.description,
                    image: model.image,
                    created_at: model.created_at,
                })
            })
            .collect()
    }

    async fn hydrate_one<C: ConnectionTrait>(conn: &C, row: recipes::Model) -> Result<Recipe> {
        Self::hydrate(conn, vec![row])
            .await?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Recipe vanished while loading relations"))
    }

    async fn find_owned<C: ConnectionTrait>(
        conn: &C,
        user_id: i32,
        id: i32,
    ) -> Result<Option<recipes::Model>> {
        Recipes::find_by_id(id)
            .filter(recipes::Column::UserId.eq(user_id))
            .one(conn)
            .await
            .context("Failed to query recipe")
    }

    /// The owner's recipes, newest first, narrowed by `filter`.
    ///
    /// Each ID family is matched through a subquery on its link table, so a
    /// recipe matching several IDs still appears once.
    pub async fn list(&self, user_id: i32, filter: &RecipeFilter) -> Result<Vec<Recipe>> {
        let mut query = Recipes::find().filter(recipes::Column::UserId.eq(user_id));

        if let Some(tag_ids) = &filter.tag_ids {
            query = query.filter(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_tags::Column::RecipeId)
                        .from(RecipeTags)
                        .and_where(recipe_tags::Column::TagId.is_in(tag_ids.iter().copied()))
                        .to_owned(),
                ),
            );
        }

        if let Some(ingredient_ids) = &filter.ingredient_ids {
            query = query.filter(
                recipes::Column::Id.in_subquery(
                    Query::select()
                        .column(recipe_ingredients::Column::RecipeId)
                        .from(RecipeIngredients)
                        .and_where(
                            recipe_ingredients::Column::IngredientId
                                .is_in(ingredient_ids.iter().copied()),
                        )
                        .to_owned(),
                ),
            );
        }

        let rows = query
            .order_by_desc(recipes::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list recipes")?;

        Self::hydrate(&self.conn, rows).await
    }

    pub async fn get(&self, user_id: i32, id: i32) -> Result<Option<Recipe>> {
        match Self::find_owned(&self.conn, user_id, id).await? {
            Some(row) => Ok(Some(Self::hydrate_one(&self.conn, row).await?)),
            None => Ok(None),
        }
    }

    pub async fn create(&self, user_id: i32, draft: RecipeDraft) -> Result<Recipe> {
        let txn = self.conn.begin().await?;

        let row = recipes::ActiveModel {
            user_id: Set(user_id),
            title: Set(draft.title),
            time_minutes: Set(draft.time_minutes),
            price_cents: Set(draft.price.cents()),
            link: Set(draft.link),
            description: Set(draft.description),
            image: Set(None),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert recipe")?;

        TagRepository::add_links(&txn, row.id, user_id, &draft.tags).await?;
        IngredientRepository::add_links(&txn, row.id, user_id, &draft.ingredients).await?;

        let recipe = Self::hydrate_one(&txn, row).await?;
        txn.commit().await?;

        debug!(recipe_id = recipe.id, user_id, "Created recipe");
        Ok(recipe)
    }

    pub async fn update(
        &self,
        user_id: i32,
        id: i32,
        changes: RecipeChanges,
    ) -> Result<Option<Recipe>> {
        let txn = self.conn.begin().await?;

        let Some(row) = Self::find_owned(&txn, user_id, id).await? else {
            return Ok(None);
        };

        let mut active: recipes::ActiveModel = row.clone().into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(time_minutes) = changes.time_minutes {
            active.time_minutes = Set(time_minutes);
        }
        if let Some(price) = changes.price {
            active.price_cents = Set(price.cents());
        }
        if let Some(link) = changes.link {
            active.link = Set(link);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }

        let row = if active.is_changed() {
            active
                .update(&txn)
                .await
                .context("Failed to update recipe")?
        } else {
            row
        };

        if let Some(tags) = &changes.tags {
            TagRepository::replace_links(&txn, id, user_id, tags).await?;
        }
        if let Some(ingredients) = &changes.ingredients {
            IngredientRepository::replace_links(&txn, id, user_id, ingredients).await?;
        }

        let recipe = Self::hydrate_one(&txn, row).await?;
        txn.commit().await?;

        Ok(Some(recipe))
    }

    /// Removes the recipe and its links; linked tags and ingredients stay.
    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let Some(row) = Self::find_owned(&txn, user_id, id).await? else {
            return Ok(false);
        };

        TagRepository::clear_links(&txn, id).await?;
        IngredientRepository::clear_links(&txn, id).await?;
        row.delete(&txn).await.context("Failed to delete recipe")?;

        txn.commit().await?;
        Ok(true)
    }

    pub async fn set_image(
        &self,
        user_id: i32,
        id: i32,
        image: &str,
    ) -> Result<Option<(Recipe, Option<String>)>> {
        let Some(row) = Self::find_owned(&self.conn, user_id, id).await? else {
            return Ok(None);
        };

        let previous = row.image.clone();
        let mut active: recipes::ActiveModel = row.into();
        active.image = Set(Some(image.to_string()));
        let row = active
            .update(&self.conn)
            .await
            .context("Failed to store recipe image")?;

        Ok(Some((Self::hydrate_one(&self.conn, row).await?, previous)))
    }
}
