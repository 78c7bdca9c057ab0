//! Identity: roles, tokens, password hashing and the revocation denylist.

mod denylist;
mod jwt;
mod password;
mod roles;

pub use denylist::{MemoryRevocationStore, PgRevocationStore, RevocationStore};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TokenKind, TokenPair};
pub use password::{hash_password, verify_against_dummy, verify_password};
pub use roles::{intersects, Role};
