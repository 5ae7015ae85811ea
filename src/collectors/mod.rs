pub mod device_path;
pub mod smart;
pub mod vdev_type;
pub mod zfs;
pub mod zfs_date;
