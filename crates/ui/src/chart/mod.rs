pub mod view;

pub use view::ChartPanel;
