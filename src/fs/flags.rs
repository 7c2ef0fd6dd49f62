//! Open-flag decoding.
//!
//! The kernel hands open(2) flags through as a raw integer; only the subset
//! below is meaningful to a sequential-stream store, and anything else is
//! dropped at decode time so the rest of the adapter never sees it.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OpenFlags: u32 {
        const WRITE_ONLY = 1 << 0;
        const READ_WRITE = 1 << 1;
        const CREATE = 1 << 2;
        const EXCLUSIVE = 1 << 3;
        const NO_CTTY = 1 << 4;
        const TRUNCATE = 1 << 5;
        const APPEND = 1 << 6;
        const NONBLOCK = 1 << 7;
        const SYNC = 1 << 8;
        const ASYNC = 1 << 9;
        const DIRECTORY = 1 << 10;
        const NO_FOLLOW = 1 << 11;
        const CLOEXEC = 1 << 12;
        const TMPFILE = 1 << 13;
        const SHARED_LOCK = 1 << 14;
        const EXCLUSIVE_LOCK = 1 << 15;
    }
}

// BSD-inherited open-time lock bits; libc does not expose them on linux.
const O_SHLOCK: i32 = 0x10;
const O_EXLOCK: i32 = 0x20;

impl OpenFlags {
    pub fn decode(raw: i32) -> Self {
        let mut flags = OpenFlags::empty();
        match raw & libc::O_ACCMODE {
            libc::O_WRONLY => flags |= OpenFlags::WRITE_ONLY,
            libc::O_RDWR => flags |= OpenFlags::READ_WRITE,
            _ => {}
        }
        if raw & libc::O_CREAT != 0 {
            flags |= OpenFlags::CREATE;
        }
        if raw & libc::O_EXCL != 0 {
            flags |= OpenFlags::EXCLUSIVE;
        }
        if raw & libc::O_NOCTTY != 0 {
            flags |= OpenFlags::NO_CTTY;
        }
        if raw & libc::O_TRUNC != 0 {
            flags |= OpenFlags::TRUNCATE;
        }
        if raw & libc::O_APPEND != 0 {
            flags |= OpenFlags::APPEND;
        }
        if raw & libc::O_NONBLOCK != 0 {
            flags |= OpenFlags::NONBLOCK;
        }
        if raw & libc::O_SYNC == libc::O_SYNC {
            flags |= OpenFlags::SYNC;
        }
        if raw & libc::O_ASYNC != 0 {
            flags |= OpenFlags::ASYNC;
        }
        if raw & libc::O_DIRECTORY != 0 {
            flags |= OpenFlags::DIRECTORY;
        }
        if raw & libc::O_NOFOLLOW != 0 {
            flags |= OpenFlags::NO_FOLLOW;
        }
        if raw & libc::O_CLOEXEC != 0 {
            flags |= OpenFlags::CLOEXEC;
        }
        #[cfg(target_os = "linux")]
        if raw & libc::O_TMPFILE == libc::O_TMPFILE {
            flags |= OpenFlags::TMPFILE;
        }
        if raw & O_SHLOCK != 0 {
            flags |= OpenFlags::SHARED_LOCK;
        }
        if raw & O_EXLOCK != 0 {
            flags |= OpenFlags::EXCLUSIVE_LOCK;
        }
        flags
    }

    /// The open requests a stream that can be written.
    pub fn wants_write(&self) -> bool {
        self.intersects(OpenFlags::WRITE_ONLY | OpenFlags::READ_WRITE)
    }

    pub fn is_read_write(&self) -> bool {
        self.contains(OpenFlags::READ_WRITE)
    }
}
