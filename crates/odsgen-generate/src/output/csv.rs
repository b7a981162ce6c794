use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::errors::GenerationError;
use crate::fields::DELIMITER;

/// `;`-delimited CSV destination that knows how many bytes reached the file.
pub struct CsvSink {
    writer: csv::Writer<CountingWriter<BufWriter<File>>>,
}

impl CsvSink {
    /// Create (or truncate) the destination file.
    pub fn create(path: &Path) -> Result<Self, GenerationError> {
        let file = BufWriter::new(File::create(path)?);
        let writer = writer_builder().from_writer(CountingWriter::new(file));
        Ok(Self { writer })
    }

    pub fn write_header<I, S>(&mut self, header: I) -> Result<(), GenerationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.writer.write_record(header)?;
        Ok(())
    }

    pub fn write_record<I, S>(&mut self, record: I) -> Result<(), GenerationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.writer.write_record(record)?;
        Ok(())
    }

    /// Flush down to the file and return the total bytes written so far.
    pub fn flush(&mut self) -> Result<u64, GenerationError> {
        self.writer.flush()?;
        Ok(self.writer.get_ref().bytes_written())
    }

    /// Flush and close the file, returning the final byte count.
    pub fn finish(self) -> Result<u64, GenerationError> {
        let counting = self.writer.into_inner().map_err(|err| err.into_error())?;
        let bytes = counting.bytes_written();
        let mut file = counting.into_inner();
        file.flush()?;
        Ok(bytes)
    }
}

/// Bytes one record occupies once serialized, terminator included.
pub fn serialized_len<I, S>(record: I) -> Result<u64, GenerationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut writer = writer_builder().from_writer(CountingWriter::new(std::io::sink()));
    writer.write_record(record)?;
    writer.flush()?;
    Ok(writer.get_ref().bytes_written())
}

fn writer_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .delimiter(DELIMITER)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .has_headers(false);
    builder
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }

    fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_len_counts_delimiters_and_terminator() {
        let len = serialized_len(["1", "Dupont", "Paris"]).expect("len");
        assert_eq!(len, "1;Dupont;Paris\n".len() as u64);
    }

    #[test]
    fn quotes_only_when_needed() {
        let len = serialized_len(["a b", "c\"d"]).expect("len");
        assert_eq!(len, "a b;\"c\"\"d\"\n".len() as u64);
    }
}
