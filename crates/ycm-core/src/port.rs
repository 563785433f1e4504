use std::net::{Ipv4Addr, TcpListener};

use crate::error::Result;

/// Ask the OS for a free TCP port on the loopback interface.
///
/// The listener is dropped before returning, so the port is only known to
/// have been free at the instant of the check. Another process may claim it
/// before the caller binds it.
pub fn get_unused_localhost_port() -> Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    let port = listener.local_addr()?.port();
    drop(listener);
    tracing::trace!(port, "allocated loopback port");
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_nonzero_port() {
        let port = get_unused_localhost_port().unwrap();
        assert_ne!(port, 0);
    }

    #[test]
    fn returned_port_can_be_bound() {
        let port = get_unused_localhost_port().unwrap();
        // Racy by nature, but on a quiet test host the port is still free.
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port));
        assert!(listener.is_ok(), "port {port} should be bindable");
    }

    #[test]
    fn consecutive_calls_both_succeed() {
        let a = get_unused_localhost_port().unwrap();
        let b = get_unused_localhost_port().unwrap();
        assert_ne!(a, 0);
        assert_ne!(b, 0);
    }
}
