use aerodesk_core::repository::{RepoResult, RuleRepository};
use aerodesk_shared::Rule;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

pub struct PostgresRuleRepository {
    pool: PgPool,
}

impl PostgresRuleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RuleRow {
    id: Uuid,
    name: String,
    code: String,
    detail: Option<String>,
    rule_values: Json<BTreeMap<String, f64>>,
    updated_at: DateTime<Utc>,
}

impl From<RuleRow> for Rule {
    fn from(row: RuleRow) -> Self {
        Rule {
            id: row.id,
            name: row.name,
            code: row.code,
            detail: row.detail,
            values: row.rule_values.0,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl RuleRepository for PostgresRuleRepository {
    async fn upsert_rule(&self, rule: &Rule) -> RepoResult<Rule> {
        // ON CONFLICT keeps the original id
        let row = sqlx::query_as::<_, RuleRow>(
            r#"
            INSERT INTO rules (id, name, code, detail, rule_values, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (name) DO UPDATE
            SET code = EXCLUDED.code,
                detail = EXCLUDED.detail,
                rule_values = EXCLUDED.rule_values,
                updated_at = EXCLUDED.updated_at
            RETURNING id, name, code, detail, rule_values, updated_at
            "#,
        )
        .bind(rule.id)
        .bind(&rule.name)
        .bind(&rule.code)
        .bind(&rule.detail)
        .bind(Json(&rule.values))
        .bind(rule.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn get_rule(&self, name: &str) -> RepoResult<Option<Rule>> {
        let row = sqlx::query_as::<_, RuleRow>(
            "SELECT id, name, code, detail, rule_values, updated_at FROM rules WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Rule::from))
    }

    async fn delete_rule(&self, name: &str) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM rules WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_rules(&self) -> RepoResult<Vec<Rule>> {
        let rows = sqlx::query_as::<_, RuleRow>(
            "SELECT id, name, code, detail, rule_values, updated_at FROM rules ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Rule::from).collect())
    }
}
