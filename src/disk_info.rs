use std::path::Path;

use sysinfo::Disks;

pub struct DiskInfo {
    pub total: u64,
    pub available: u64,
}

impl DiskInfo {
    pub fn usage_percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.total.saturating_sub(self.available) as f32 / self.total as f32
    }
}

/// Space on the volume that holds `path` (longest matching mount point).
pub fn disk_info_for(path: &Path) -> Option<DiskInfo> {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let disks = Disks::new_with_refreshed_list();
    disks
        .list()
        .iter()
        .filter(|disk| path.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| DiskInfo {
            total: disk.total_space(),
            available: disk.available_space(),
        })
}
