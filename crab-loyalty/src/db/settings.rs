//! Loyalty settings (single row, id = 1)

use shared::models::LoyaltySettings;
use sqlx::PgPool;

use super::BoxError;

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    gc_discount_percent: f64,
    designer_discount_percent: f64,
    wholesale_discount_percent: f64,
    other_discount_percent: f64,
    points_redemption_rate: f64,
    updated_at: i64,
}

impl From<SettingsRow> for LoyaltySettings {
    fn from(row: SettingsRow) -> Self {
        LoyaltySettings {
            gc_discount_percent: row.gc_discount_percent,
            designer_discount_percent: row.designer_discount_percent,
            wholesale_discount_percent: row.wholesale_discount_percent,
            other_discount_percent: row.other_discount_percent,
            points_redemption_rate: row.points_redemption_rate,
            updated_at: row.updated_at,
        }
    }
}

const COLUMNS: &str = "gc_discount_percent, designer_discount_percent, wholesale_discount_percent, \
    other_discount_percent, points_redemption_rate, updated_at";

/// Current settings; defaults when the row is missing
pub async fn get(pool: &PgPool) -> Result<LoyaltySettings, BoxError> {
    let row: Option<SettingsRow> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM loyalty_settings WHERE id = 1"))
            .fetch_optional(pool)
            .await?;
    Ok(row.map(LoyaltySettings::from).unwrap_or_default())
}

pub async fn save(pool: &PgPool, settings: &LoyaltySettings) -> Result<LoyaltySettings, BoxError> {
    let row: SettingsRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO loyalty_settings (id, gc_discount_percent, designer_discount_percent,
                                      wholesale_discount_percent, other_discount_percent,
                                      points_redemption_rate, updated_at)
        VALUES (1, $1, $2, $3, $4, $5, $6)
        ON CONFLICT (id)
        DO UPDATE SET gc_discount_percent = EXCLUDED.gc_discount_percent,
                      designer_discount_percent = EXCLUDED.designer_discount_percent,
                      wholesale_discount_percent = EXCLUDED.wholesale_discount_percent,
                      other_discount_percent = EXCLUDED.other_discount_percent,
                      points_redemption_rate = EXCLUDED.points_redemption_rate,
                      updated_at = EXCLUDED.updated_at
        RETURNING {COLUMNS}
        "#
    ))
    .bind(settings.gc_discount_percent)
    .bind(settings.designer_discount_percent)
    .bind(settings.wholesale_discount_percent)
    .bind(settings.other_discount_percent)
    .bind(settings.points_redemption_rate)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}
