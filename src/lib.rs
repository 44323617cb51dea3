/*!
bgpstream-stats provides a BGP data stream consumption surface and the
aggregation pipeline built on top of it.

The crate does not parse MRT or speak to collector brokers for data transfer.
Records enter through the [RecordSource] seam: any backend that can produce
[StreamRecord]s plugs in there. Two sources ship with the crate: an in-memory
source and a line-delimited-JSON source that reads local or remote files.

## Consuming a stream

```no_run
use bgpstream_stats::{BgpStream, JsonlSource};

let source = JsonlSource::open("updates.jsonl").unwrap();
let mut stream = BgpStream::new(source)
    .add_filter("collector", "rrc06").unwrap()
    .add_filter("record-type", "updates").unwrap()
    .add_interval_filter(1427846570, 1427846670)
    .start().unwrap();

while let Some(record) = stream.next_record().unwrap() {
    println!("{} {}.{} {}", record.status, record.project, record.collector, record.timestamp);
    for elem in &record.elems {
        println!("\t{}", elem);
    }
}
```

## Running the aggregation pipeline

```no_run
use bgpstream_stats::analyze::{analyze, AnalyzeConfig};
use bgpstream_stats::{JsonlSource, RecordType};

let cfg = AnalyzeConfig {
    start: 1427846570,
    end: 1427900000,
    record_type: RecordType::Updates,
    collectors: vec!["rrc06".to_string()],
    workers: 4,
};
let analysis = analyze(&cfg, |_unit| JsonlSource::open("updates.jsonl")).unwrap();
analysis.write_csv(std::io::stdout()).unwrap();
```
*/

pub mod analyze;
pub mod broker;
#[cfg(feature = "db")]
pub mod db;
pub mod error;
pub mod models;
pub mod pool;
pub mod stream;
pub mod timeslice;
pub mod topology;

pub use crate::error::StreamError;
pub use crate::models::*;
pub use crate::stream::filter::{parse_filter_string, Filter, Filterable};
pub use crate::stream::iters::{ElemIterator, RecordIterator};
pub use crate::stream::source::{JsonlSource, MemorySource, RecordSource};
pub use crate::stream::BgpStream;
