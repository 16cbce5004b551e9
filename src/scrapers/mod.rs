pub mod areas;
mod clusters;
mod fetch;
pub mod naver;
mod normalize;
mod pipeline;
mod session;
pub mod traits;

pub use naver::NaverLandScraper;
pub use traits::ListingScraper;
