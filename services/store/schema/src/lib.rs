pub mod cart_lines;
pub mod clothes;
pub mod roles_permissions;
pub mod tokens;
pub mod users;
