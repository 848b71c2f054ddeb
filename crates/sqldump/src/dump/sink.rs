//! Statement sinks.

use std::io::Write;

use crate::error::Result;

/// Destination for generated statements, in emission order.
pub trait StatementSink: Send {
    /// Emit one complete statement (without a trailing newline).
    fn emit(&mut self, statement: &str) -> Result<()>;

    /// Flush buffered output.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes each statement followed by a newline.
pub struct WriterSink<W: Write + Send> {
    writer: W,
    statements: u64,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            statements: 0,
        }
    }

    /// Number of statements written so far.
    pub fn statements(&self) -> u64 {
        self.statements
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> StatementSink for WriterSink<W> {
    fn emit(&mut self, statement: &str) -> Result<()> {
        self.writer.write_all(statement.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.statements += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Collects statements in memory.
impl StatementSink for Vec<String> {
    fn emit(&mut self, statement: &str) -> Result<()> {
        self.push(statement.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_sink_terminates_with_newline() {
        let mut sink = WriterSink::new(Vec::new());
        sink.emit("USE `shop`;").unwrap();
        sink.emit("INSERT INTO `t` VALUES (1);").unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.statements(), 2);
        assert_eq!(
            String::from_utf8(sink.into_inner()).unwrap(),
            "USE `shop`;\nINSERT INTO `t` VALUES (1);\n"
        );
    }

    #[test]
    fn test_writer_sink_propagates_io_errors() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut sink = WriterSink::new(Broken);
        let err = sink.emit("SELECT 1;").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(sink.statements(), 0);
    }
}
