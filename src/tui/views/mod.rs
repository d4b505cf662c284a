pub mod campaign_form;
pub mod campaign_list;
pub mod campaign_viewer;
pub mod modals;
