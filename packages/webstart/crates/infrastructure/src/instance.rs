//! Single running launcher per user.
//!
//! The first process binds a unix socket under the configuration directory.
//! Later invocations connect, send their arguments as one whitespace-joined
//! payload and exit; the first process turns each payload into a startup
//! notification. Only platforms that report re-invocations as notifications
//! take part; elsewhere every invocation launches on its own.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use domain::system::Platform;

#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("Failed to bind instance socket {path}")]
    Bind {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to forward arguments to the running launcher")]
    Forward(#[source] io::Error),

    #[error("Failed to start the instance listener")]
    Listener(#[source] io::Error),
}

/// Outcome of [`claim`].
pub enum InstanceRole {
    /// This process is the running launcher.
    #[cfg(unix)]
    Primary(unix::PrimaryInstance),
    /// Another launcher received the arguments; this process is done.
    Forwarded,
    /// No single-instance support on this platform.
    Standalone,
}

#[cfg(unix)]
pub use unix::{claim, PrimaryInstance};

#[cfg(not(unix))]
pub fn claim(_socket: &Path, _args: &[String]) -> Result<InstanceRole, InstanceError> {
    Ok(InstanceRole::Standalone)
}

/// [`claim`] where `platform` delivers re-invocations as notifications,
/// [`InstanceRole::Standalone`] everywhere else.
pub fn claim_for(
    platform: &dyn Platform,
    socket: &Path,
    args: &[String],
) -> Result<InstanceRole, InstanceError> {
    if !platform.delivers_reinvocation_as_notification() {
        debug!("Re-invocations start their own launcher on this platform");
        return Ok(InstanceRole::Standalone);
    }
    claim(socket, args)
}

/// Joins `args` into the payload the running launcher splits on whitespace.
pub fn payload(args: &[String]) -> String {
    for arg in args.iter().filter(|arg| arg.contains(char::is_whitespace)) {
        warn!(
            "Argument '{}' contains whitespace, the running launcher will split it",
            arg
        );
    }
    args.join(" ")
}

#[cfg(unix)]
mod unix {
    use std::fs;
    use std::io::{self, Read, Write};
    use std::os::unix::net::{UnixListener, UnixStream};
    use std::path::{Path, PathBuf};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;
    use tracing::{debug, info, warn};

    use super::{payload, InstanceError, InstanceRole};

    const READ_TIMEOUT: Duration = Duration::from_secs(5);

    /// Becomes the running launcher or hands `args` to the one already running.
    pub fn claim(socket: &Path, args: &[String]) -> Result<InstanceRole, InstanceError> {
        if forward(socket, args)? {
            return Ok(InstanceRole::Forwarded);
        }

        match UnixListener::bind(socket) {
            Ok(listener) => Ok(InstanceRole::Primary(PrimaryInstance::new(listener, socket))),
            // lost a race against another first start
            Err(source) if source.kind() == io::ErrorKind::AddrInUse => {
                if forward(socket, args)? {
                    Ok(InstanceRole::Forwarded)
                } else {
                    Err(InstanceError::Bind {
                        path: socket.to_path_buf(),
                        source,
                    })
                }
            }
            Err(source) => Err(InstanceError::Bind {
                path: socket.to_path_buf(),
                source,
            }),
        }
    }

    /// Sends `args` if a launcher is listening; clears a stale socket file
    /// otherwise.
    fn forward(socket: &Path, args: &[String]) -> Result<bool, InstanceError> {
        match UnixStream::connect(socket) {
            Ok(mut stream) => {
                stream
                    .write_all(payload(args).as_bytes())
                    .map_err(InstanceError::Forward)?;
                info!("Forwarded arguments to the running launcher");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
                debug!("Removing stale instance socket {}", socket.display());
                let _ = fs::remove_file(socket);
                Ok(false)
            }
            Err(_) => Ok(false),
        }
    }

    /// The bound instance socket. The socket file is removed on drop.
    pub struct PrimaryInstance {
        listener: UnixListener,
        path: PathBuf,
    }

    impl PrimaryInstance {
        fn new(listener: UnixListener, path: &Path) -> Self {
            Self {
                listener,
                path: path.to_path_buf(),
            }
        }

        /// Accepts connections on a background thread and passes each payload
        /// to `handle`. Stops once `handle` returns false.
        pub fn serve(
            &self,
            mut handle: impl FnMut(String) -> bool + Send + 'static,
        ) -> Result<JoinHandle<()>, InstanceError> {
            let listener = self.listener.try_clone().map_err(InstanceError::Listener)?;

            thread::Builder::new()
                .name("instance-socket".into())
                .spawn(move || {
                    for stream in listener.incoming() {
                        let payload = match stream.and_then(read_payload) {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!("Dropping instance connection: {}", e);
                                continue;
                            }
                        };
                        debug!("Instance socket received '{}'", payload);
                        if !handle(payload) {
                            break;
                        }
                    }
                })
                .map_err(InstanceError::Listener)
        }
    }

    impl Drop for PrimaryInstance {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.path);
        }
    }

    fn read_payload(mut stream: UnixStream) -> io::Result<String> {
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        let mut payload = String::new();
        stream.read_to_string(&mut payload)?;
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::system::OperatingSystem;
    use tempfile::tempdir;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_linux_invocations_stay_standalone() {
        let dir = tempdir().unwrap();
        let socket = dir.path().join("instance.sock");

        let first = claim_for(&OperatingSystem::Linux, &socket, &args(&["A.jnlp"])).unwrap();
        let second = claim_for(&OperatingSystem::Linux, &socket, &args(&["B.jnlp"])).unwrap();

        assert!(matches!(first, InstanceRole::Standalone));
        assert!(matches!(second, InstanceRole::Standalone));
        assert!(!socket.exists());
    }

    #[test]
    fn test_payload_joins_with_spaces() {
        assert_eq!(
            payload(&args(&["-verbose", "/Users/me/My Apps/App.jnlp"])),
            "-verbose /Users/me/My Apps/App.jnlp"
        );
        assert_eq!(payload(&[]), "");
    }
}
