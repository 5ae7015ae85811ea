pub mod record;
pub mod smart;
pub mod zfs;
