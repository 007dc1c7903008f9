pub mod ean_names;
pub mod gs1_results;
pub mod opinions;
pub mod package_costs;
pub mod product_params;
pub mod workbook_diff;
