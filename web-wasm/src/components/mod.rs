pub mod action_buttons;
pub mod card_view;
pub mod header;
pub mod progress_bar;
pub mod results_panel;
pub mod table_view;
