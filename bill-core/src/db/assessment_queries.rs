use anyhow::{Context, Result};
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;

use crate::domain::{AssessmentRecord, AssessmentUpdate};

/// Write the populated fields of `update` onto assessment `id`.
///
/// Returns the number of rows touched (0 when the id does not exist).
pub async fn update_assessment(pool: &PgPool, id: &str, update: &AssessmentUpdate) -> Result<u64> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE assessments SET updated_at = ");
    builder.push_bind(OffsetDateTime::now_utc());

    let num_people = update
        .num_people_column()
        .with_context(|| format!("num_people {:?} does not fit the column", update.num_people))?;
    if let Some(v) = num_people {
        builder.push(", num_people = ").push_bind(v);
    }
    if let Some(v) = &update.season {
        builder.push(", season = ").push_bind(v.clone());
    }
    if let Some(v) = &update.house_type {
        builder.push(", house_type = ").push_bind(v.clone());
    }
    if let Some(v) = update.bi_monthly_kwh {
        builder.push(", bi_monthly_kwh = ").push_bind(v);
    }
    if let Some(v) = update.monthly_kwh() {
        builder.push(", monthly_kwh = ").push_bind(v);
    }
    if let Some(v) = update.input_kwh() {
        builder.push(", input_kwh = ").push_bind(v);
    }
    if let Some(v) = update.estimated_bill {
        builder.push(", estimated_bill = ").push_bind(v);
    }
    if let Some(v) = &update.selected_appliances {
        builder.push(", selected_appliances = ").push_bind(v.clone());
    }
    if let Some(v) = &update.appliance_usage {
        builder.push(", appliance_usage = ").push_bind(v.clone());
    }
    if let Some(v) = &update.final_breakdown {
        builder.push(", final_breakdown = ").push_bind(v.clone());
    }
    if let Some(v) = update.predicted_kwh {
        builder.push(", predicted_kwh = ").push_bind(v);
    }

    builder.push(" WHERE id = ").push_bind(id.to_string());

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Most recently updated assessment for a user.
pub async fn latest_assessment(pool: &PgPool, user_id: &str) -> Result<Option<AssessmentRecord>> {
    let row = sqlx::query_as::<_, AssessmentRecord>(
        r#"
        SELECT
            id,
            user_id,
            num_people,
            season,
            house_type,
            bi_monthly_kwh,
            monthly_kwh,
            estimated_bill,
            input_kwh,
            predicted_kwh,
            selected_appliances,
            appliance_usage,
            final_breakdown,
            updated_at
        FROM assessments
        WHERE user_id = $1
        ORDER BY updated_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
