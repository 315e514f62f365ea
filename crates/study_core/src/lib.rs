pub mod agenda;
pub mod assignment;
pub mod category;
pub mod day;
pub mod ids;
pub mod notifications;
pub mod review;
pub mod service;
pub mod settings;
pub mod store;
pub mod streak;
pub mod timer;

pub use crate::day::{Clock, DayId};
pub use crate::ids::ItemId;
pub use crate::service::{Planner, PlannerBuilder};
