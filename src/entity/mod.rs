pub mod booking;
pub mod membership;
pub mod password_reset_tokens;
pub mod pelanggan;
pub mod pengguna;
pub mod role;
pub mod stok;

pub use booking::Entity as Booking;
pub use membership::Entity as Membership;
pub use password_reset_tokens::Entity as PasswordResetTokens;
pub use pelanggan::Entity as Pelanggan;
pub use pengguna::Entity as Pengguna;
pub use role::Entity as Role;
pub use stok::Entity as Stok;
