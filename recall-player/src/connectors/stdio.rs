//! [`MoveProvider`] for an external engine speaking a line protocol.
//!
//! Each request is one line: the board fingerprint, the symbol of the color
//! to move, then every legal move in notation, separated by spaces:
//!
//! ```text
//! ---------------------------OX------XO--------------------------- X D3 C4 F5 E6
//! ```
//!
//! The engine replies with one line holding either `row col` (0-indexed) or
//! a move in notation such as `D3`.

use super::{MoveProvider, ProviderError};
use async_std::io::{self, prelude::*, BufReader, Read, Write};
use async_trait::async_trait;
use itertools::Itertools;
use recall_othello::{Board, Color, Location, LocationList};
use tracing::trace;

pub struct StdioProvider<R, W> {
    reader: BufReader<R>,
    writer: W,
}

impl StdioProvider<io::Stdin, io::Stdout> {
    /// Talk to whoever is on the other end of this process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl<R: Read + Unpin, W: Write + Unpin> StdioProvider<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<R, W> MoveProvider for StdioProvider<R, W>
where
    R: Read + Unpin + Send,
    W: Write + Unpin + Send,
{
    async fn suggest(
        &mut self,
        board: Board,
        color: Color,
        legal: LocationList,
    ) -> Result<Location, ProviderError> {
        let request = format!(
            "{} {} {}\n",
            board.fingerprint(),
            color.symbol(),
            legal.format(" ")
        );
        self.writer.write_all(request.as_bytes()).await?;
        self.writer.flush().await?;

        let mut reply = String::new();
        if self.reader.read_line(&mut reply).await? == 0 {
            return Err(ProviderError::Disconnected);
        }
        trace!(reply = reply.trim(), "provider replied");

        parse_reply(reply.trim())
    }
}

fn parse_reply(reply: &str) -> Result<Location, ProviderError> {
    let unparseable = || ProviderError::Unparseable {
        reply: reply.to_owned(),
    };

    if reply.eq_ignore_ascii_case("pass") {
        return Err(ProviderError::NoMove);
    }

    let segments: Vec<&str> = reply.split_whitespace().collect();
    match segments.as_slice() {
        [row, col] => {
            let row: usize = row.parse().map_err(|_| unparseable())?;
            let col: usize = col.parse().map_err(|_| unparseable())?;
            Location::from_coords(row, col).ok_or_else(unparseable)
        }
        [notation] => notation.parse().map_err(|_| unparseable()),
        _ => Err(unparseable()),
    }
}
