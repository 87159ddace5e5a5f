//! 数据目录锁
//!
//! 文件后端的每个 Entity 会缓存自己的记录，同一数据目录同时只能有一个写入者。
//! 服务器在整个生命周期内持有锁，CLI 写命令只在执行期间持有。

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;

use tracing::{debug, error, info, warn};

use crate::errors::{ReflinkerError, Result};

/// 锁文件名，不以 `.json` 结尾，不会被当作短码
pub const LOCK_FILE_NAME: &str = ".reflinker.lock";

/// 数据目录的独占锁，drop 时释放
#[derive(Debug)]
pub struct DataDirLock {
    path: PathBuf,
}

impl DataDirLock {
    /// 获取数据目录锁
    ///
    /// 锁文件记录持有者 PID。持有者进程已退出时视为孤立锁，清理后重试。
    pub fn acquire(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(LOCK_FILE_NAME);

        // 最多清理一次孤立锁
        for _ in 0..2 {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    let pid = process::id();
                    if let Err(e) = writeln!(file, "{}", pid).and_then(|_| file.sync_all()) {
                        let _ = fs::remove_file(&path);
                        return Err(ReflinkerError::storage(format!(
                            "Failed to write lock file {}: {}",
                            path.display(),
                            e
                        )));
                    }
                    info!("Data directory locked: {} (PID: {})", path.display(), pid);
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => match read_holder(&path) {
                    Some(holder) if process_alive(holder) => {
                        return Err(ReflinkerError::locked(format!(
                            "Data directory {} is in use by another reflinker process (PID: {})",
                            data_dir.display(),
                            holder
                        )));
                    }
                    _ => {
                        warn!("Removing stale lock file: {}", path.display());
                        if let Err(e) = fs::remove_file(&path)
                            && e.kind() != ErrorKind::NotFound
                        {
                            return Err(ReflinkerError::storage(format!(
                                "Failed to remove stale lock file {}: {}",
                                path.display(),
                                e
                            )));
                        }
                    }
                },
                Err(e) => {
                    return Err(ReflinkerError::storage(format!(
                        "Failed to create lock file {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Err(ReflinkerError::locked(format!(
            "Data directory {} could not be locked",
            data_dir.display()
        )))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for DataDirLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Data directory lock released: {}", self.path.display()),
            Err(e) => error!("无法删除锁文件 {}: {}", self.path.display(), e),
        }
    }
}

fn read_holder(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    // EPERM 说明进程存在但属于其他用户
    !matches!(signal::kill(Pid::from_raw(raw), None), Err(Errno::ESRCH))
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // 无法探测时按仍在运行处理，需要手动删除锁文件
    true
}
