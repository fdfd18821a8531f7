pub mod class;
pub mod schedule;

use serde::{Deserialize, Deserializer};

pub use class::{Class, ClassSummary, ClassWithCount, NewClassRequest, UpdateClassRequest};
pub use schedule::{
    IdInput, NewScheduleRequest, Schedule, ScheduleDetail, ScheduleInput, ScheduleType,
    UpdateScheduleRequest,
};

/// Lets `Option<Option<T>>` tell an explicit `null` (`Some(None)`) apart from
/// a missing field (`None`).
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
