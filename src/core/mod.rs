pub mod etl;
pub mod fanout;
pub mod pipeline;
pub mod points;
pub mod report;
pub mod standings;
pub mod stats;
pub mod top_n;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::domain::model::{LeagueReport, LeagueSnapshot};
pub use crate::domain::ports::{ConfigProvider, FplApi, Pipeline, Storage};
pub use crate::utils::error::Result;
