//! Async call orchestration.
//!
//! Every call runs as its own task: await the shared interpreter future, bind the
//! request, send it, interpret the response. Request and response bodies are held
//! in [`BodyGuard`]s, so both are closed on every exit path.

use crate::error::{ResolutionError, SoapError};
use crate::http_interpreter::HttpBinding;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use soapbind_core::{Arguments, BodyGuard, CallOptions, SoapHeader};
use soapbind_transport::HttpTransport;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

pub type BindingResult = Result<Arc<dyn HttpBinding>, ResolutionError>;

/// Memoized, shareable handle to the HTTP binding of a client.
///
/// The wrapped future runs at most once, driven by whichever call awaits it
/// first; every clone observes the same result.
#[derive(Clone)]
pub struct InterpreterFuture {
    inner: Shared<BoxFuture<'static, BindingResult>>,
}

impl InterpreterFuture {
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = BindingResult> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    pub fn ready(binding: Arc<dyn HttpBinding>) -> Self {
        Self::from_future(futures::future::ready(Ok(binding)))
    }

    pub fn failed(error: ResolutionError) -> Self {
        Self::from_future(futures::future::ready(Err(error)))
    }

    pub async fn resolve(&self) -> BindingResult {
        self.inner.clone().await
    }

    /// Result if already resolved
    pub fn peek(&self) -> Option<&BindingResult> {
        self.inner.peek()
    }
}

impl fmt::Debug for InterpreterFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.peek() {
            None => "pending",
            Some(Ok(_)) => "resolved",
            Some(Err(_)) => "failed",
        };
        f.debug_struct("InterpreterFuture")
            .field("state", &state)
            .finish()
    }
}

/// Decoded value of a call together with the SOAP headers of the response
#[derive(Debug, Clone, PartialEq)]
pub struct SoapReply {
    pub value: Value,
    pub headers: Vec<SoapHeader>,
}

enum CallState {
    Running(JoinHandle<Result<SoapReply, SoapError>>),
    Failed(Option<SoapError>),
}

/// Handle to a call scheduled by [`SoapHttpClient::send_async`].
///
/// Resolves to the decoded value. Dropping the handle does not stop the call.
pub struct SoapFuture {
    state: CallState,
}

impl SoapFuture {
    /// Await the full reply including response headers
    pub async fn reply(self) -> Result<SoapReply, SoapError> {
        match self.state {
            CallState::Running(handle) => handle.await.map_err(join_failure)?,
            CallState::Failed(error) => Err(error.unwrap_or_else(|| {
                SoapError::TaskFailed("Call result already taken".to_string())
            })),
        }
    }
}

impl Future for SoapFuture {
    type Output = Result<Value, SoapError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.state {
            CallState::Running(handle) => Pin::new(handle).poll(cx).map(|joined| {
                joined
                    .map_err(join_failure)
                    .and_then(|result| result.map(|reply| reply.value))
            }),
            CallState::Failed(error) => Poll::Ready(Err(error.take().unwrap_or_else(|| {
                SoapError::TaskFailed("Call result already taken".to_string())
            }))),
        }
    }
}

impl fmt::Debug for SoapFuture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            CallState::Running(handle) if handle.is_finished() => "finished",
            CallState::Running(_) => "running",
            CallState::Failed(_) => "failed",
        };
        f.debug_struct("SoapFuture").field("state", &state).finish()
    }
}

fn join_failure(err: tokio::task::JoinError) -> SoapError {
    if err.is_panic() {
        SoapError::TaskFailed("Call task panicked".to_string())
    } else {
        SoapError::TaskFailed("Call task was cancelled".to_string())
    }
}

/// SOAP client sending calls over an [`HttpTransport`].
///
/// Cloning is cheap; clones share the transport and the interpreter future.
#[derive(Clone)]
pub struct SoapHttpClient {
    transport: Arc<dyn HttpTransport>,
    interpreter: InterpreterFuture,
}

impl SoapHttpClient {
    pub fn new(transport: Arc<dyn HttpTransport>, interpreter: InterpreterFuture) -> Self {
        Self {
            transport,
            interpreter,
        }
    }

    pub fn interpreter(&self) -> &InterpreterFuture {
        &self.interpreter
    }

    /// Schedule a call on the current Tokio runtime and return immediately
    pub fn send_async(
        &self,
        operation: impl Into<String>,
        arguments: impl Into<Arguments>,
        options: Option<CallOptions>,
        headers: Option<Vec<SoapHeader>>,
    ) -> SoapFuture {
        let call = Call {
            operation: operation.into(),
            arguments: arguments.into(),
            options: options.unwrap_or_default(),
            headers: headers.unwrap_or_default(),
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!(operation = %call.operation, "No runtime to schedule SOAP call on");
                return SoapFuture {
                    state: CallState::Failed(Some(SoapError::TaskFailed(e.to_string()))),
                };
            }
        };

        let transport = self.transport.clone();
        let interpreter = self.interpreter.clone();
        let handle = runtime.spawn(async move { call.execute(transport, interpreter).await });

        SoapFuture {
            state: CallState::Running(handle),
        }
    }

    /// Run a call to completion.
    ///
    /// Response headers reported by the engine are appended to `output_headers`.
    pub async fn send(
        &self,
        operation: impl Into<String>,
        arguments: impl Into<Arguments>,
        options: Option<CallOptions>,
        headers: Option<Vec<SoapHeader>>,
        output_headers: Option<&mut Vec<SoapHeader>>,
    ) -> Result<Value, SoapError> {
        let reply = self
            .send_async(operation, arguments, options, headers)
            .reply()
            .await?;
        if let Some(output) = output_headers {
            output.extend(reply.headers);
        }
        Ok(reply.value)
    }

    /// Run a call to completion from code that is not async.
    ///
    /// The call is spawned onto a process-wide runtime owned by this crate and the
    /// calling thread blocks until it finishes. Fails with `TaskFailed` when invoked
    /// from inside a Tokio runtime; use [`send`](Self::send) there.
    pub fn send_blocking(
        &self,
        operation: impl Into<String>,
        arguments: impl Into<Arguments>,
        options: Option<CallOptions>,
        headers: Option<Vec<SoapHeader>>,
        output_headers: Option<&mut Vec<SoapHeader>>,
    ) -> Result<Value, SoapError> {
        let operation = operation.into();
        if tokio::runtime::Handle::try_current().is_ok() {
            warn!(operation = %operation, "Blocking SOAP call attempted inside an async runtime");
            return Err(SoapError::TaskFailed(
                "send_blocking cannot run inside an async runtime".to_string(),
            ));
        }

        let runtime = blocking_runtime()?;
        let reply = runtime.block_on(async {
            self.send_async(operation, arguments, options, headers)
                .reply()
                .await
        })?;
        if let Some(output) = output_headers {
            output.extend(reply.headers);
        }
        Ok(reply.value)
    }

    /// Call any operation by name
    pub fn call(&self, operation: impl Into<String>, arguments: impl Into<Arguments>) -> SoapFuture {
        self.send_async(operation, arguments, None, None)
    }
}

impl fmt::Debug for SoapHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapHttpClient")
            .field("interpreter", &self.interpreter)
            .finish_non_exhaustive()
    }
}

static BLOCKING_RUNTIME: OnceLock<Result<tokio::runtime::Runtime, String>> = OnceLock::new();

fn blocking_runtime() -> Result<&'static tokio::runtime::Runtime, SoapError> {
    let runtime = BLOCKING_RUNTIME.get_or_init(|| {
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        builder
            .worker_threads(2)
            .thread_name("soapbind-blocking")
            .enable_all();
        builder.build().map_err(|e| e.to_string())
    });
    runtime
        .as_ref()
        .map_err(|e| SoapError::TaskFailed(format!("Failed to start blocking runtime: {}", e)))
}

struct Call {
    operation: String,
    arguments: Arguments,
    options: CallOptions,
    headers: Vec<SoapHeader>,
}

impl Call {
    async fn execute(
        self,
        transport: Arc<dyn HttpTransport>,
        interpreter: InterpreterFuture,
    ) -> Result<SoapReply, SoapError> {
        let operation = self.operation.as_str();

        let binding = interpreter.resolve().await.inspect_err(|e| {
            debug!(operation, error = %e, "Interpreter resolution failed");
        })?;

        let request = BodyGuard::new(binding.request(
            operation,
            &self.arguments,
            &self.options,
            &self.headers,
        )?);

        debug!(operation, method = %request.method(), uri = %request.uri(), "Sending SOAP call");
        let response = BodyGuard::new(transport.send_request(&request).await?);
        trace!(operation, status = %response.status(), "Received SOAP response");

        let mut headers = Vec::new();
        let value = binding.response(&response, operation, &mut headers)?;
        Ok(SoapReply { value, headers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soapbind_core::{WireRequest, WireResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NeverCalled;

    impl HttpBinding for NeverCalled {
        fn request(
            &self,
            _operation: &str,
            _arguments: &Arguments,
            _options: &CallOptions,
            _headers: &[SoapHeader],
        ) -> Result<WireRequest, SoapError> {
            unreachable!()
        }

        fn response(
            &self,
            _response: &WireResponse,
            _operation: &str,
            _output_headers: &mut Vec<SoapHeader>,
        ) -> Result<Value, SoapError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn test_interpreter_future_resolves_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let future = InterpreterFuture::from_future(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(NeverCalled) as Arc<dyn HttpBinding>)
        });
        assert!(future.peek().is_none());

        let clone = future.clone();
        let (a, b) = tokio::join!(future.resolve(), clone.resolve());
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert!(future.resolve().await.is_ok());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(matches!(future.peek(), Some(Ok(_))));
    }

    #[tokio::test]
    async fn test_failed_future_is_terminal() {
        let future = InterpreterFuture::failed(ResolutionError::new("WSDL unreachable"));
        assert_eq!(
            future.resolve().await.err().unwrap().message(),
            "WSDL unreachable"
        );
        assert!(future.resolve().await.is_err());
        assert_eq!(format!("{:?}", future), "InterpreterFuture { state: \"failed\" }");
    }

    #[test]
    fn test_send_async_without_runtime_fails() {
        let client = SoapHttpClient::new(
            Arc::new(soapbind_transport::CannedTransport::new()),
            InterpreterFuture::ready(Arc::new(NeverCalled)),
        );
        let future = client.call("getStockPrice", Arguments::new());
        let result = futures::executor::block_on(future);
        assert!(matches!(result, Err(SoapError::TaskFailed(_))));
    }

    #[tokio::test]
    async fn test_send_blocking_inside_runtime_is_rejected() {
        let client = SoapHttpClient::new(
            Arc::new(soapbind_transport::CannedTransport::new()),
            InterpreterFuture::ready(Arc::new(NeverCalled)),
        );
        let err = client
            .send_blocking("getStockPrice", Arguments::new(), None, None, None)
            .unwrap_err();
        assert!(matches!(err, SoapError::TaskFailed(ref m) if m.contains("inside an async runtime")));
    }
}
