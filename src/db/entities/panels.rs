//! Finished panels: where the image lives and the dialogue drawn on it.
use chrono::Utc;
use sea_orm::{ActiveValue::Set, QueryOrder, entity::prelude::*};

use crate::error::ComicError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "panels")]
/// A rendered panel
pub struct Model {
    #[sea_orm(primary_key)]
    /// db id
    pub id: i32,
    /// public URL of the stored PNG
    pub image_url: String,
    /// dialogue lines as a JSON array
    pub text: String,
    /// when the panel was recorded
    pub created_at: DateTime,
}

/// panels have no relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Dialogue lines drawn on this panel.
    pub fn text_lines(&self) -> Result<Vec<String>, ComicError> {
        serde_json::from_str(&self.text).map_err(|err| {
            ComicError::InternalServerError(format!(
                "panel {} has malformed text column: {err}",
                self.id
            ))
        })
    }
}

/// Records a stored panel and returns the new row.
pub async fn record<C, S>(db: &C, image_url: &str, lines: &[S]) -> Result<Model, ComicError>
where
    C: ConnectionTrait,
    S: AsRef<str>,
{
    let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
    let text = serde_json::to_string(&lines)
        .map_err(|err| ComicError::InternalServerError(err.to_string()))?;
    let active = ActiveModel {
        image_url: Set(image_url.to_string()),
        text: Set(text),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    };
    Ok(active.insert(db).await?)
}

/// All panels, oldest first.
pub async fn list<C: ConnectionTrait>(db: &C) -> Result<Vec<Model>, ComicError> {
    Ok(Entity::find().order_by_asc(Column::Id).all(db).await?)
}

/// A single panel by id.
pub async fn find<C: ConnectionTrait>(db: &C, id: i32) -> Result<Option<Model>, ComicError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect_test_db, migrations::Migrator};
    use sea_orm_migration::MigratorTrait;

    async fn setup_db() -> DatabaseConnection {
        let db = connect_test_db().await.expect("connect test db");
        Migrator::up(&db, None).await.expect("run migrations");
        db
    }

    #[tokio::test]
    async fn record_then_find_round_trips_lines() {
        let db = setup_db().await;
        let lines = ["Vincent: Hi", "Adrien: \"quoted\", with commas"];
        let model = record(&db, "http://comics.example.org/images/a.png", &lines)
            .await
            .expect("record");

        let found = find(&db, model.id)
            .await
            .expect("find")
            .expect("panel exists");
        assert_eq!(found.image_url, "http://comics.example.org/images/a.png");
        assert_eq!(found.text_lines().expect("lines"), lines);
    }

    #[tokio::test]
    async fn list_is_in_insertion_order() {
        let db = setup_db().await;
        for name in ["one", "two", "three"] {
            record(&db, &format!("http://x/{name}.png"), &[name])
                .await
                .expect("record");
        }
        let urls: Vec<String> = list(&db)
            .await
            .expect("list")
            .into_iter()
            .map(|panel| panel.image_url)
            .collect();
        assert_eq!(urls, ["http://x/one.png", "http://x/two.png", "http://x/three.png"]);
    }

    #[tokio::test]
    async fn missing_panel_is_none() {
        let db = setup_db().await;
        assert!(find(&db, 42).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn empty_dialogue_is_recorded_as_empty_array() {
        let db = setup_db().await;
        let model = record::<_, &str>(&db, "http://x/blank.png", &[])
            .await
            .expect("record");
        assert_eq!(model.text, "[]");
        assert!(model.text_lines().expect("lines").is_empty());
    }
}
