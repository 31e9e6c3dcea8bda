pub mod admin;
pub mod role;
pub mod user;

pub use admin::{
    ActionResponse, Activity, DashboardStats, Invitation, InvitationStatus, InviteRequest,
    InviteResponse, UserSearchResult,
};
pub use role::{Role, UnknownRole};
pub use user::User;
