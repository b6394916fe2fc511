use std::{
    io::{BufRead, BufReader, Write},
    net::{TcpListener, TcpStream},
    thread::{self, JoinHandle},
};

/// Plaintext smtp server accepting a single session.
/// Offers AUTH but no STARTTLS and records every line the client sends,
/// the mail content included.
pub struct FakeSmtp {
    port: u16,
    session: JoinHandle<Vec<String>>,
}

impl FakeSmtp {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let session = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            session(stream)
        });
        Self { port, session }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the session to end.
    pub fn received(self) -> Vec<String> {
        self.session.join().unwrap()
    }
}

fn session(stream: TcpStream) -> Vec<String> {
    let mut writer = stream.try_clone().unwrap();
    let mut reader = BufReader::new(stream);
    let mut received = Vec::new();
    let mut in_data = false;

    writer.write_all(b"220 localhost ESMTP\r\n").unwrap();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']).to_string();
        if in_data {
            if line == "." {
                in_data = false;
                writer.write_all(b"250 2.0.0 queued\r\n").unwrap();
            } else {
                received.push(line);
            }
            continue;
        }

        let command = line.to_ascii_uppercase();
        received.push(line);
        let reply: &[u8] = if command.starts_with("EHLO") {
            b"250-localhost\r\n250-AUTH PLAIN LOGIN\r\n250 8BITMIME\r\n"
        } else if command.starts_with("AUTH") {
            b"235 2.7.0 authenticated\r\n"
        } else if command == "DATA" {
            in_data = true;
            b"354 end with <CRLF>.<CRLF>\r\n"
        } else if command == "QUIT" {
            writer.write_all(b"221 2.0.0 bye\r\n").ok();
            break;
        } else {
            b"250 2.0.0 ok\r\n"
        };
        writer.write_all(reply).unwrap();
    }
    received
}
