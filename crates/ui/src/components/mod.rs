pub mod call_list;
pub mod drawer;
pub mod footer;
pub mod header;

pub use call_list::CallList;
pub use drawer::Drawer;
pub use footer::Footer;
pub use header::Header;
