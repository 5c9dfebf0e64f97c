//! Small helpers shared by the agents

use std::{io, net::TcpListener};

/// Ask the OS for a currently unused localhost port
///
/// The port is released before returning, so another process may grab it first.
pub fn free_port() -> io::Result<u16> {
    let listener = TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}

/// `N` distinct unused localhost ports
///
/// Every listener is held until all ports are known, so the OS cannot hand out the same port
/// twice. They are all released before returning.
pub fn free_ports<const N: usize>() -> io::Result<[u16; N]> {
    let mut listeners = Vec::with_capacity(N);
    let mut ports = [0; N];
    for port in &mut ports {
        let listener = TcpListener::bind(("127.0.0.1", 0))?;
        *port = listener.local_addr()?.port();
        listeners.push(listener);
    }
    Ok(ports)
}
