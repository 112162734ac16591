//! Reading and writing documents through files and streams

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::document::Document;
use crate::error::JsonResult;
use crate::node::NodeId;
use crate::print::Format;

impl Document {
    /// Read `reader` to the end and parse the first value in it
    pub fn parse_reader<R: Read>(&mut self, mut reader: R) -> JsonResult<NodeId> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.parse(&buf)
    }

    /// Parse the file at `path`
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> JsonResult<NodeId> {
        let file = File::open(path)?;
        self.parse_reader(file)
    }

    /// Serialize `id` into `writer`
    pub fn write_to<W: Write>(&self, mut writer: W, id: NodeId, format: Format) -> JsonResult<()> {
        let text = self.render(id, format)?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Serialize `id` into the file at `path`, replacing its contents
    pub fn write_file(&self, path: impl AsRef<Path>, id: NodeId, format: Format) -> JsonResult<()> {
        let file = File::create(path)?;
        self.write_to(file, id, format)
    }
}
