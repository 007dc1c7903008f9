// Adapters layer: concrete row stores and HTTP clients for the external
// systems the tasks talk to.

pub mod delimited;
pub mod gateway;
pub mod panel;
pub mod storefront;
pub mod workbook;
