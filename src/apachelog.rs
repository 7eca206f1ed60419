//! Write HTTP access log files in the Combined Log Format (extended
//! Common Log Format) for access logs (Apache style), as per
//! <https://httpd.apache.org/docs/2.4/logs.html>, plus an error log
//! for requests that failed.

use std::mem::swap;
use std::panic;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, Instant};
use std::io::{Write, stderr, sink};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rouille::{Request, Response, ResponseBody};

use crate::easy_fs::open_log_output;
use crate::webutils::errorpage_from_error;

// "06/Dec/2023:02:02:47 +0000"
pub fn write_time(
    outp: &mut impl Write,
    time: SystemTime
) -> Result<()> {
    let dt: DateTime<Utc> = DateTime::from(time);
    write!(outp, "{}", dt.format("%d/%b/%Y:%H:%M:%S +0000"))?;
    Ok(())
}

fn request_line(request: &Request) -> String {
    format!("{} {}", request.method(), request.raw_url())
}

/// Response body length, if known. `ResponseBody` has no accessor
/// for it, so the body is taken apart and put back together.
fn body_length(response: &mut Response) -> Option<usize> {
    let mut responsebody = ResponseBody::empty();
    swap(&mut responsebody, &mut response.data);
    let (data, length) = responsebody.into_reader_and_size();
    responsebody =
        if let Some(len) = length {
            ResponseBody::from_reader_and_size(data, len)
        } else {
            ResponseBody::from_reader(data)
        };
    swap(&mut responsebody, &mut response.data);
    length
}

/// Write to access.log. We also add the duration at the end.
pub fn write_combined(
    outp: &mut impl Write,
    request: &Request,
    duration: Duration,
    response: &mut Response, // temporarily swaps out ResponseBody and back
) -> Result<()> {
    // Write the time when the log entry is made, not when the
    // request started
    let now = SystemTime::now();
    write!(outp, "{} - - [", request.remote_addr().ip())?;
    write_time(outp, now)?;
    let len = body_length(response);
    writeln!(outp, "] {:?} {} {} {:?} {:?} {duration:?}",
             request_line(request),
             response.status_code,
             len.unwrap_or(0),
             request.header("referer").unwrap_or("-"),
             request.header("user-agent").unwrap_or("-")
    )?;
    outp.flush()?;
    Ok(())
}

/// Write to error.log
fn write_error(
    outp: &mut impl Write,
    request: &Request,
    duration: Duration,
    err: &anyhow::Error,
) -> Result<()> {
    let now = SystemTime::now();
    write!(outp, "[")?;
    write_time(outp, now)?;
    writeln!(outp, "] [error] [client {}] {:?} {duration:?}: {err:#}",
             request.remote_addr().ip(),
             request_line(request))?;
    outp.flush()?;
    Ok(())
}


/// The log files to write to, access_log if a response was produced,
/// error_log otherwise. The code calls flush once per entry.
pub struct Logs {
    pub access_log: Box<dyn Write + Send + Sync>,
    pub error_log: Box<dyn Write + Send + Sync>,
}

impl Logs {
    pub fn open_in_basedir(
        logbasedir: &Path,
    ) -> Result<Arc<Mutex<Logs>>>
    {
        Ok(Arc::new(Mutex::new(Logs {
            access_log: open_log_output(logbasedir.join("http_access.log"))?,
            error_log: open_log_output(logbasedir.join("http_error.log"))?,
        })))
    }

    /// Both logs going to stderr, e.g. when running under a
    /// supervisor that collects it.
    pub fn stderr() -> Arc<Mutex<Logs>> {
        Arc::new(Mutex::new(Logs {
            access_log: Box::new(stderr()),
            error_log: Box::new(stderr()),
        }))
    }

    pub fn discard() -> Arc<Mutex<Logs>> {
        Arc::new(Mutex::new(Logs {
            access_log: Box::new(sink()),
            error_log: Box::new(sink()),
        }))
    }
}


/// Run `handler`, log its outcome, and turn errors into a 500 page.
pub fn log_combined<F>(
    request: &Request,
    handler: F
) -> Response
where
    F: FnOnce() -> (Arc<Mutex<Logs>>, anyhow::Result<Response>),
{
    let start_instant = Instant::now();

    // Note that we always resume unwinding afterwards.
    let result = panic::catch_unwind(panic::AssertUnwindSafe(handler));
    let elapsed = start_instant.elapsed();

    match result {
        Ok((logs, result)) => match result {
            Ok(mut response) => {
                match logs.lock() {
                    Ok(mut logs) =>
                        if let Err(e) = write_combined(
                            &mut logs.access_log, request, elapsed, &mut response)
                        {
                            log::warn!("could not write to access log: {e:#}")
                        },
                    Err(_) => log::warn!("access log lock is poisoned"),
                }
                response
            }
            Err(err) => {
                match logs.lock() {
                    Ok(mut logs) =>
                        if let Err(e) = write_error(
                            &mut logs.error_log, request, elapsed, &err)
                        {
                            log::warn!("could not write to error log: {e:#}")
                        },
                    Err(_) => log::warn!("error log lock is poisoned"),
                }
                errorpage_from_error(&err)
            }
        },
        Err(payload) => {
            log::error!("[panic] handling {:?} after {elapsed:?}", request_line(request));
            // The panic handler will print the payload contents
            panic::resume_unwind(payload);
        }
    }
}
