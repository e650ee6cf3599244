pub mod member;

pub use member::{Member, MEMBERS_TABLE};
