use sqlx::types::Json;

use crate::{db::{affected, Found}, error::{FieldErrors, Result}, logic::{competition::{cup::Cup, grouped_cup::GroupedCup, template::{CupTemplate, GroupedCupTemplate}}, types::{Db, TemplateId}}};

fn require_name(name: &str) -> Result<()> {
    let mut errors = FieldErrors::new();
    errors.require("name", name);
    errors.into_result()
}

impl CupTemplate {
    pub async fn fetch_from_db(db: &Db, id: TemplateId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM CupTemplate
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("cup template")
    }

    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM CupTemplate
            ORDER BY name"
        ).fetch_all(db).await?)
    }

    pub async fn save(&mut self, db: &Db) -> Result<()> {
        require_name(&self.name)?;
        self.rules.validate()?;
        self.id = sqlx::query_scalar(
            "INSERT INTO CupTemplate (name, rules)
            VALUES ($1, $2)
            RETURNING id"
        ).bind(self.name.as_str())
        .bind(Json(&self.rules))
        .fetch_one(db).await?;

        Ok(())
    }

    pub async fn update(&self, db: &Db) -> Result<()> {
        require_name(&self.name)?;
        self.rules.validate()?;
        let result = sqlx::query(
            "UPDATE CupTemplate SET name = $1, rules = $2
            WHERE id = $3"
        ).bind(self.name.as_str())
        .bind(Json(&self.rules))
        .bind(self.id)
        .execute(db).await?;

        affected(result, "cup template")
    }

    pub async fn delete(db: &Db, id: TemplateId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM CupTemplate WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "cup template")
    }

    // Create and save a new cup with the rules of the template.
    pub async fn create_cup(&self, db: &Db, name: &str) -> Result<Cup> {
        let mut cup = self.instantiate(name);
        cup.save(db).await?;
        return Ok(cup);
    }
}

impl GroupedCupTemplate {
    pub async fn fetch_from_db(db: &Db, id: TemplateId) -> Result<Self> {
        sqlx::query_as(
            "SELECT * FROM GroupedCupTemplate
            WHERE id = $1"
        ).bind(id)
        .fetch_optional(db).await?
        .found("grouped cup template")
    }

    pub async fn fetch_all(db: &Db) -> Result<Vec<Self>> {
        Ok(sqlx::query_as(
            "SELECT * FROM GroupedCupTemplate
            ORDER BY name"
        ).fetch_all(db).await?)
    }

    pub async fn save(&mut self, db: &Db) -> Result<()> {
        require_name(&self.name)?;
        self.format.validate()?;
        self.id = sqlx::query_scalar(
            "INSERT INTO GroupedCupTemplate (name, format, rank_criteria)
            VALUES ($1, $2, $3)
            RETURNING id"
        ).bind(self.name.as_str())
        .bind(Json(&self.format))
        .bind(Json(&self.rank_criteria))
        .fetch_one(db).await?;

        Ok(())
    }

    pub async fn update(&self, db: &Db) -> Result<()> {
        require_name(&self.name)?;
        self.format.validate()?;
        let result = sqlx::query(
            "UPDATE GroupedCupTemplate SET name = $1, format = $2, rank_criteria = $3
            WHERE id = $4"
        ).bind(self.name.as_str())
        .bind(Json(&self.format))
        .bind(Json(&self.rank_criteria))
        .bind(self.id)
        .execute(db).await?;

        affected(result, "grouped cup template")
    }

    pub async fn delete(db: &Db, id: TemplateId) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM GroupedCupTemplate WHERE id = $1"
        ).bind(id)
        .execute(db).await?;

        affected(result, "grouped cup template")
    }

    pub async fn create_grouped_cup(&self, db: &Db, name: &str) -> Result<GroupedCup> {
        let mut grouped_cup = self.instantiate(name);
        grouped_cup.save(db).await?;
        return Ok(grouped_cup);
    }
}
