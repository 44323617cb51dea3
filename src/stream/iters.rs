/*!
Iterator adapters over a started stream.

`RecordIterator` yields records and logs (then stops on) stream errors;
callers that need the errors should drive [BgpStream::next_record] directly.
`ElemIterator` flattens records into their elements.
*/
use crate::models::{StreamElem, StreamRecord};
use crate::stream::source::RecordSource;
use crate::stream::BgpStream;
use log::error;

pub struct RecordIterator<S> {
    pub(crate) stream: BgpStream<S>,
}

impl<S> RecordIterator<S> {
    fn new(stream: BgpStream<S>) -> Self {
        RecordIterator { stream }
    }
}

impl<S: RecordSource> Iterator for RecordIterator<S> {
    type Item = StreamRecord;

    fn next(&mut self) -> Option<StreamRecord> {
        match self.stream.next_record() {
            Ok(record) => record,
            Err(e) => {
                error!("stream error: {}", e);
                None
            }
        }
    }
}

pub struct ElemIterator<S> {
    cache_elems: Vec<StreamElem>,
    record_iter: RecordIterator<S>,
}

impl<S> ElemIterator<S> {
    fn new(stream: BgpStream<S>) -> Self {
        ElemIterator {
            cache_elems: vec![],
            record_iter: RecordIterator::new(stream),
        }
    }
}

impl<S: RecordSource> Iterator for ElemIterator<S> {
    type Item = StreamElem;

    fn next(&mut self) -> Option<StreamElem> {
        loop {
            if let Some(elem) = self.cache_elems.pop() {
                return Some(elem);
            }
            let record = self.record_iter.next()?;
            if record.elems.is_empty() {
                continue;
            }
            // reverse so popping preserves the record's element order
            self.cache_elems = record.elems;
            self.cache_elems.reverse();
        }
    }
}

/// Use [RecordIterator] as the default iterator over a started stream.
impl<S: RecordSource> IntoIterator for BgpStream<S> {
    type Item = StreamRecord;
    type IntoIter = RecordIterator<S>;

    fn into_iter(self) -> Self::IntoIter {
        RecordIterator::new(self)
    }
}

impl<S> BgpStream<S> {
    pub fn into_record_iter(self) -> RecordIterator<S> {
        RecordIterator::new(self)
    }

    pub fn into_elem_iter(self) -> ElemIterator<S> {
        ElemIterator::new(self)
    }
}
