use tracing::info;

use super::{clip_upper, enrich, guarded_ratio, FeatureError, FeatureStage, ZeroDenominator};
use crate::domain::columns::{
    ACTIVITY_MINUTES_PER_WEEK, ALCOHOL_PER_WEEK, DIET_SCORE, SCREEN_HOURS_PER_DAY,
    SLEEP_HOURS_PER_DAY, SMOKING_STATUS,
};
use crate::domain::{FieldValue, RecordSet};

/// WHO weekly activity recommendation in minutes.
const RECOMMENDED_ACTIVITY_MINUTES: f64 = 150.0;
const ACTIVITY_RATIO_CAP: f64 = 3.0;
const SCREEN_SLEEP_RATIO_CAP: f64 = 5.0;
const SLEEP_EFFICIENCY_CAP: f64 = 2.0;
const SEDENTARY_SCREEN_HOURS: f64 = 6.0;
const HABIT_POINTS: i64 = 2;

/// Behavioral balance (activity, screens, sleep) and the composite lifestyle
/// score.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifestyleStage;

impl LifestyleStage {
    /// 0 to 10, two points per healthy habit.
    pub fn lifestyle_score(
        diet_score: f64,
        activity_minutes: f64,
        sleep_hours: f64,
        alcohol_per_week: f64,
        smoking_status: Option<&str>,
    ) -> i64 {
        [
            diet_score >= 6.0,
            activity_minutes >= RECOMMENDED_ACTIVITY_MINUTES,
            (7.0..=9.0).contains(&sleep_hours),
            alcohol_per_week <= 2.0,
            smoking_status == Some("Never"),
        ]
        .into_iter()
        .filter(|habit| *habit)
        .count() as i64
            * HABIT_POINTS
    }
}

impl FeatureStage for LifestyleStage {
    fn name(&self) -> &'static str {
        "lifestyle"
    }

    fn output_columns(&self) -> &'static [&'static str] {
        &[
            "activity_adequacy_ratio",
            "screen_sleep_ratio",
            "sedentary_risk_flag",
            "lifestyle_score",
            "sleep_efficiency",
        ]
    }

    fn transform(&self, records: &RecordSet) -> Result<RecordSet, FeatureError> {
        info!("deriving behavioral and lifestyle features");
        enrich(self.name(), records, |record| {
            let activity = record.number(ACTIVITY_MINUTES_PER_WEEK)?;
            let screen = record.number(SCREEN_HOURS_PER_DAY)?;
            let sleep = record.number(SLEEP_HOURS_PER_DAY)?;
            let diet = record.number(DIET_SCORE)?;
            let alcohol = record.number(ALCOHOL_PER_WEEK)?;
            let score = Self::lifestyle_score(
                diet,
                activity,
                sleep,
                alcohol,
                record.text(SMOKING_STATUS)?,
            );

            record.set(
                "activity_adequacy_ratio",
                (activity / RECOMMENDED_ACTIVITY_MINUTES).min(ACTIVITY_RATIO_CAP),
            );
            record.set(
                "screen_sleep_ratio",
                clip_upper(
                    guarded_ratio(screen, sleep, ZeroDenominator::Missing),
                    SCREEN_SLEEP_RATIO_CAP,
                ),
            );
            record.set(
                "sedentary_risk_flag",
                FieldValue::flag(
                    screen >= SEDENTARY_SCREEN_HOURS && activity < RECOMMENDED_ACTIVITY_MINUTES,
                ),
            );
            record.set("lifestyle_score", score);
            record.set(
                "sleep_efficiency",
                clip_upper(
                    guarded_ratio(sleep, screen + 1.0, ZeroDenominator::Zero),
                    SLEEP_EFFICIENCY_CAP,
                ),
            );
            Ok(())
        })
    }
}
