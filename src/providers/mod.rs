pub mod er_api;
pub mod util;

pub use er_api::ErApiProvider;
