//! Byte sources for asset requests.

use std::path::PathBuf;

use super::{AssetError, AssetRequest};

/// Raw bytes for one request, one buffer per requested file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    /// The request this answers.
    pub request: AssetRequest,
    /// File contents in request order, or the first failure.
    pub files: Result<Vec<Vec<u8>>, AssetError>,
}

/// Starts fetches and reports finished ones.
///
/// The preloader keeps at most one request in flight, so implementations
/// only need to track a single pending fetch.
pub trait AssetFetcher {
    /// Begin fetching every file of `request`.
    fn fetch(&mut self, request: &AssetRequest);

    /// Take a finished fetch, if one is available.
    fn poll(&mut self) -> Option<FetchedAsset>;
}

/// Reads assets synchronously from a base directory.
#[derive(Debug)]
pub struct FsFetcher {
    base: PathBuf,
    finished: Option<FetchedAsset>,
}

impl FsFetcher {
    /// Fetcher rooted at `base`.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            finished: None,
        }
    }
}

impl AssetFetcher for FsFetcher {
    fn fetch(&mut self, request: &AssetRequest) {
        let files = request
            .files
            .iter()
            .map(|file| {
                std::fs::read(self.base.join(file)).map_err(|e| AssetError::Fetch {
                    file: file.clone(),
                    reason: e.to_string(),
                })
            })
            .collect();
        self.finished = Some(FetchedAsset {
            request: request.clone(),
            files,
        });
    }

    fn poll(&mut self) -> Option<FetchedAsset> {
        self.finished.take()
    }
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::HttpFetcher;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod web {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    use super::{AssetError, AssetFetcher, AssetRequest, FetchedAsset};

    /// Downloads assets with the browser `fetch` API relative to a base URL.
    pub struct HttpFetcher {
        base: String,
        finished: Rc<RefCell<Option<FetchedAsset>>>,
    }

    impl HttpFetcher {
        /// Fetcher rooted at `base` (e.g. `"assets"`).
        #[must_use]
        pub fn new(base: &str) -> Self {
            Self {
                base: base.trim_end_matches('/').to_owned(),
                finished: Rc::new(RefCell::new(None)),
            }
        }
    }

    async fn download(url: &str) -> Result<Vec<u8>, String> {
        let window = web_sys::window().ok_or("no window")?;
        let init = web_sys::RequestInit::new();
        init.set_method("GET");
        init.set_mode(web_sys::RequestMode::Cors);
        let request = web_sys::Request::new_with_str_and_init(url, &init)
            .map_err(|e| format!("{e:?}"))?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| format!("{e:?}"))?;
        let response: web_sys::Response =
            response.dyn_into().map_err(|e| format!("{e:?}"))?;
        if !response.ok() {
            return Err(format!("HTTP {}", response.status()));
        }
        let buffer = response.array_buffer().map_err(|e| format!("{e:?}"))?;
        let buffer = JsFuture::from(buffer).await.map_err(|e| format!("{e:?}"))?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }

    impl AssetFetcher for HttpFetcher {
        fn fetch(&mut self, request: &AssetRequest) {
            let request = request.clone();
            let base = self.base.clone();
            let slot = Rc::clone(&self.finished);
            wasm_bindgen_futures::spawn_local(async move {
                let mut files = Vec::with_capacity(request.files.len());
                let mut failure = None;
                for file in &request.files {
                    match download(&format!("{base}/{file}")).await {
                        Ok(bytes) => files.push(bytes),
                        Err(reason) => {
                            failure = Some(AssetError::Fetch {
                                file: file.clone(),
                                reason,
                            });
                            break;
                        }
                    }
                }
                let files = failure.map_or(Ok(files), Err);
                *slot.borrow_mut() = Some(FetchedAsset { request, files });
            });
        }

        fn poll(&mut self) -> Option<FetchedAsset> {
            self.finished.borrow_mut().take()
        }
    }
}
