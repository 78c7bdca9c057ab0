use super::{nullable, put, CustomerSummary, Values, CUSTOMER_SUMMARY};
use crate::model::{col, Column, EntityMeta, Include};
use crate::resource::Resource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

pub struct Reviews;

const COLUMNS: &[Column] = &[
    col("review_id", "int4"),
    col("rating", "int4"),
    col("comment", "text"),
    col("reviewed_at", "timestamptz"),
    col("order_id", "int4"),
    col("customer_id", "int4"),
];

const INCLUDES: &[Include] = &[Include::to_one(
    "customer",
    "customer",
    CUSTOMER_SUMMARY,
    "customer_id",
    "customer_id",
)];

#[derive(Debug, Serialize, FromRow)]
pub struct Review {
    pub review_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub reviewed_at: DateTime<Utc>,
    pub order_id: Option<i32>,
    pub customer_id: Option<i32>,
    pub customer: Option<Json<CustomerSummary>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct NewReview {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: i32,
    pub comment: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub order_id: Option<i32>,
    pub customer_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ReviewPatch {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub rating: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub comment: Option<Option<String>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub order_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub customer_id: Option<Option<i32>>,
}

impl Resource for Reviews {
    const PATH: &'static str = "review";
    const LABEL: &'static str = "Review";
    const META: EntityMeta = EntityMeta {
        table: "review",
        pk: &["review_id"],
        columns: COLUMNS,
        includes: INCLUDES,
    };

    type Id = i32;
    type Row = Review;
    type Create = NewReview;
    type Patch = ReviewPatch;

    fn insert_values(input: NewReview) -> Values {
        let mut v: Values = vec![
            ("rating", input.rating.into()),
            ("comment", input.comment.into()),
            ("order_id", input.order_id.into()),
            ("customer_id", input.customer_id.into()),
        ];
        put(&mut v, "reviewed_at", input.reviewed_at);
        v
    }

    fn patch_values(patch: ReviewPatch) -> Values {
        let mut v = Values::new();
        put(&mut v, "rating", patch.rating);
        put(&mut v, "comment", patch.comment);
        put(&mut v, "reviewed_at", patch.reviewed_at);
        put(&mut v, "order_id", patch.order_id);
        put(&mut v, "customer_id", patch.customer_id);
        v
    }
}
