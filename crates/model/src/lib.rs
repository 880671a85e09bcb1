use std::fmt::Debug;

use chrono::{DateTime, TimeZone};
use schemars::JsonSchema;
use serde::Serialize;
pub use serde_with;
use utility::id::{HasId, Id};

pub mod breach;
pub mod location;
pub mod membership;
pub mod zone;

/// Example values used by the `/schema?exampleData=true` routes.
pub trait ExampleData {
    fn example_data() -> Self;
}

pub struct DateTimeRange<Tz>
where
    Tz: TimeZone,
{
    pub first: DateTime<Tz>,
    pub last: DateTime<Tz>,
}

impl<Tz: TimeZone> DateTimeRange<Tz> {
    pub fn new(first: DateTime<Tz>, last: DateTime<Tz>) -> Self {
        Self { first, last }
    }

    pub fn is_well_formed(&self) -> bool {
        self.first <= self.last
    }

    pub fn contains(&self, instant: &DateTime<Tz>) -> bool {
        *instant >= self.first && *instant <= self.last
    }
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V>
where
    V: HasId,
    V::IdType: Serialize + Debug + Clone,
{
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}
