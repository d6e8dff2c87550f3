//! Tag and ingredient repositories.
//!
//! Both registries share one shape: rows unique per `(user_id, name)` and a
//! link table keyed by `(recipe_id, <attribute>_id)`. The repositories are
//! generated from a single template so the two cannot drift apart.

use crate::db::map_unique_violation;
use crate::entities::{ingredients, recipe_ingredients, recipe_tags, tags};
use crate::models::Attribute;
use anyhow::{Context, Result};
use sea_orm::sea_query::{OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use std::collections::{BTreeSet, HashMap};

/// Generate a repository for one attribute registry.
///
/// Arguments: repository name, entity module, link-table module, the
/// link table's attribute column, its field name, and a label for messages.
macro_rules! attribute_repository {
    (
        $repo:ident,
        entity: $entity:ident,
        link: $link:ident,
        link_column: $link_col:ident,
        link_field: $link_field:ident,
        label: $label:literal
    ) => {
        impl From<$entity::Model> for Attribute {
            fn from(model: $entity::Model) -> Self {
                Self {
                    id: model.id,
                    user_id: model.user_id,
                    name: model.name,
                }
            }
        }

        pub struct $repo;

        impl $repo {
            /// Lists the owner's rows by name, descending.
            ///
            /// With `assigned_only` the listing is every row linked to at
            /// least one recipe, regardless of owner.
            pub async fn list<C: ConnectionTrait>(
                conn: &C,
                user_id: i32,
                assigned_only: bool,
            ) -> Result<Vec<Attribute>> {
                let query = if assigned_only {
                    $entity::Entity::find().filter(
                        $entity::Column::Id.in_subquery(
                            Query::select()
                                .column($link::Column::$link_col)
                                .from($link::Entity)
                                .to_owned(),
                        ),
                    )
                } else {
                    $entity::Entity::find().filter($entity::Column::UserId.eq(user_id))
                };

                let rows = query
                    .order_by_desc($entity::Column::Name)
                    .order_by_desc($entity::Column::Id)
                    .all(conn)
                    .await
                    .context(concat!("Failed to list ", $label, "s"))?;

                Ok(rows.into_iter().map(Attribute::from).collect())
            }

            async fn find_owned<C: ConnectionTrait>(
                conn: &C,
                user_id: i32,
                id: i32,
            ) -> Result<Option<$entity::Model>> {
                $entity::Entity::find_by_id(id)
                    .filter($entity::Column::UserId.eq(user_id))
                    .one(conn)
                    .await
                    .context(concat!("Failed to query ", $label))
            }

            pub async fn get<C: ConnectionTrait>(
                conn: &C,
                user_id: i32,
                id: i32,
            ) -> Result<Option<Attribute>> {
                Ok(Self::find_owned(conn, user_id, id).await?.map(Attribute::from))
            }

            /// Idempotent insert keyed by `(user_id, name)`.
            ///
            /// The keyed read is retried once if it misses, which only
            /// happens when a concurrent delete lands between the two
            /// statements.
            pub async fn get_or_create<C: ConnectionTrait>(
                conn: &C,
                user_id: i32,
                name: &str,
            ) -> Result<Attribute> {
                for _ in 0..2 {
                    $entity::Entity::insert($entity::ActiveModel {
                        user_id: Set(user_id),
                        name: Set(name.to_string()),
                        ..Default::default()
                    })
                    .on_conflict(
                        OnConflict::columns([$entity::Column::UserId, $entity::Column::Name])
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(conn)
                    .await
                    .context(concat!("Failed to insert ", $label))?;

                    let row = $entity::Entity::find()
                        .filter($entity::Column::UserId.eq(user_id))
                        .filter($entity::Column::Name.eq(name))
                        .one(conn)
                        .await
                        .context(concat!("Failed to query ", $label, " by name"))?;

                    if let Some(row) = row {
                        return Ok(row.into());
                    }
                }

                anyhow::bail!(concat!($label, " '{}' vanished during get-or-create"), name)
            }

            pub async fn rename<C: ConnectionTrait>(
                conn: &C,
                user_id: i32,
                id: i32,
                name: &str,
            ) -> Result<Option<Attribute>> {
                let Some(row) = Self::find_owned(conn, user_id, id).await? else {
                    return Ok(None);
                };

                let mut active: $entity::ActiveModel = row.into();
                active.name = Set(name.to_string());
                let updated = active.update(conn).await.map_err(|e| {
                    map_unique_violation(
                        e,
                        format!(concat!($label, " with name '{}' already exists"), name),
                    )
                })?;

                Ok(Some(updated.into()))
            }

            /// Deletes an owned row and its recipe links. Recipes are kept.
            pub async fn delete<C: ConnectionTrait>(
                conn: &C,
                user_id: i32,
                id: i32,
            ) -> Result<bool> {
                let Some(row) = Self::find_owned(conn, user_id, id).await? else {
                    return Ok(false);
                };

                $link::Entity::delete_many()
                    .filter($link::Column::$link_col.eq(id))
                    .exec(conn)
                    .await?;
                row.delete(conn).await?;

                Ok(true)
            }

            /// Rows linked to each of `recipe_ids`, ordered by ID.
            pub async fn linked_to<C: ConnectionTrait>(
                conn: &C,
                recipe_ids: &[i32],
            ) -> Result<HashMap<i32, Vec<Attribute>>> {
                if recipe_ids.is_empty() {
                    return Ok(HashMap::new());
                }

                let rows = $link::Entity::find()
                    .filter($link::Column::RecipeId.is_in(recipe_ids.iter().copied()))
                    .find_also_related($entity::Entity)
                    .all(conn)
                    .await
                    .context(concat!("Failed to load recipe ", $label, "s"))?;

                let mut linked: HashMap<i32, Vec<Attribute>> = HashMap::new();
                for (link, row) in rows {
                    if let Some(row) = row {
                        linked.entry(link.recipe_id).or_default().push(row.into());
                    }
                }
                for attributes in linked.values_mut() {
                    attributes.sort_by_key(|a| a.id);
                }

                Ok(linked)
            }

            /// Get-or-creates each name under `user_id` and links it.
            pub async fn add_links<C: ConnectionTrait>(
                conn: &C,
                recipe_id: i32,
                user_id: i32,
                names: &[String],
            ) -> Result<()> {
                let mut ids = BTreeSet::new();
                for name in names {
                    ids.insert(Self::get_or_create(conn, user_id, name).await?.id);
                }

                if ids.is_empty() {
                    return Ok(());
                }

                let links: Vec<$link::ActiveModel> = ids
                    .into_iter()
                    .map(|id| $link::ActiveModel {
                        recipe_id: Set(recipe_id),
                        $link_field: Set(id),
                    })
                    .collect();

                $link::Entity::insert_many(links)
                    .on_conflict(
                        OnConflict::columns([
                            $link::Column::RecipeId,
                            $link::Column::$link_col,
                        ])
                        .do_nothing()
                        .to_owned(),
                    )
                    .exec_without_returning(conn)
                    .await
                    .context(concat!("Failed to link recipe ", $label, "s"))?;

                Ok(())
            }

            pub async fn clear_links<C: ConnectionTrait>(conn: &C, recipe_id: i32) -> Result<()> {
                $link::Entity::delete_many()
                    .filter($link::Column::RecipeId.eq(recipe_id))
                    .exec(conn)
                    .await?;
                Ok(())
            }

            /// Replaces the recipe's whole linked set with `names`.
            pub async fn replace_links<C: ConnectionTrait>(
                conn: &C,
                recipe_id: i32,
                user_id: i32,
                names: &[String],
            ) -> Result<()> {
                Self::clear_links(conn, recipe_id).await?;
                Self::add_links(conn, recipe_id, user_id, names).await
            }
        }
    };
}

attribute_repository!(
    TagRepository,
    entity: tags,
    link: recipe_tags,
    link_column: TagId,
    link_field: tag_id,
    label: "Tag"
);

attribute_repository!(
    IngredientRepository,
    entity: ingredients,
    link: recipe_ingredients,
    link_column: IngredientId,
    link_field: ingredient_id,
    label: "Ingredient"
);
