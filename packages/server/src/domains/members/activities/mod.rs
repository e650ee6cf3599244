//! Member domain activities

mod queries;
mod register_member;

pub use queries::list_members;
pub use register_member::{register_member, MemberApplication, COLOR_NEW_MEMBER};
