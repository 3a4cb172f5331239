use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::error::PoseError;
use super::process::{ChildGuard, PoseCommand};
use super::record::PoseRecord;
use crate::analysis::FrameSample;

/// Lazy, single-pass stream of frame samples read from the pose command.
///
/// The header line is consumed on open; each following line yields one
/// frame. The child process is reaped at end of output, or killed if the
/// stream is dropped early.
pub struct PoseStream<R = std::process::ChildStdout> {
    reader: BufReader<R>,
    guard: Option<ChildGuard>,
    fps: f64,
    frame_count: Option<u64>,
    line: usize,
    last_index: Option<u64>,
    finished: bool,
}

impl PoseStream {
    pub fn open(command: &PoseCommand, video: &Path, sample_ms: u32) -> Result<Self, PoseError> {
        let mut guard = command.spawn(video, sample_ms)?;
        let stdout = guard.take_stdout().ok_or(PoseError::MissingHeader)?;
        PoseStream::from_reader(stdout, Some(guard))
    }
}

impl<R: Read> PoseStream<R> {
    pub fn from_reader(reader: R, guard: Option<ChildGuard>) -> Result<Self, PoseError> {
        let mut stream = PoseStream {
            reader: BufReader::new(reader),
            guard,
            fps: 0.0,
            frame_count: None,
            line: 0,
            last_index: None,
            finished: false,
        };

        match stream.next_record()? {
            Some(PoseRecord::Header { fps, frame_count }) => {
                stream.fps = fps;
                stream.frame_count = frame_count;
                Ok(stream)
            }
            _ => Err(PoseError::MissingHeader),
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frame_count(&self) -> Option<u64> {
        self.frame_count
    }

    fn next_record(&mut self) -> Result<Option<PoseRecord>, PoseError> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let trimmed = buf.trim();
            if trimmed.is_empty() {
                continue;
            }
            return PoseRecord::parse(trimmed)
                .map(Some)
                .map_err(|e| PoseError::InvalidRecord {
                    line: self.line,
                    message: e.to_string(),
                });
        }
    }

    fn finish(&mut self) -> Option<Result<FrameSample, PoseError>> {
        self.finished = true;
        match self.guard.as_mut().map(|g| g.wait()) {
            Some(Err(e)) => Some(Err(e)),
            _ => None,
        }
    }
}

impl<R: Read> Iterator for PoseStream<R> {
    type Item = Result<FrameSample, PoseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.next_record() {
            Ok(Some(PoseRecord::Frame { index, landmarks })) => {
                if let Some(last) = self.last_index.filter(|last| index <= *last) {
                    self.finished = true;
                    return Some(Err(PoseError::InvalidRecord {
                        line: self.line,
                        message: format!("frame index {} does not follow {}", index, last),
                    }));
                }
                self.last_index = Some(index);
                Some(Ok(FrameSample::from((index, landmarks))))
            }
            Ok(Some(PoseRecord::Header { .. })) => {
                self.finished = true;
                Some(Err(PoseError::InvalidRecord {
                    line: self.line,
                    message: "unexpected second header".into(),
                }))
            }
            Ok(None) => self.finish(),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
