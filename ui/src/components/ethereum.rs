//! Bridge from the page's injected `window.ethereum` to `WalletProvider`.
//!
//! Only functional in WASM builds; native builds never find a wallet.

use std::time::Duration;

use atm_common::error::ProviderError;
use atm_common::provider::WalletProvider;
use serde_json::Value;

/// Handle to the injected EIP-1193 provider (MetaMask or compatible).
#[allow(dead_code)] // unused with the dev-wallet feature
#[derive(Clone, Debug)]
pub struct BrowserWallet {
    #[cfg(target_family = "wasm")]
    ethereum: wasm_bindgen::JsValue,
}

impl BrowserWallet {
    /// Look for `window.ethereum`. `None` means no wallet extension.
    pub fn detect() -> Option<Self> {
        #[cfg(target_family = "wasm")]
        {
            let window = web_sys::window()?;
            let ethereum =
                js_sys::Reflect::get(&window, &wasm_bindgen::JsValue::from_str("ethereum")).ok()?;
            if ethereum.is_undefined() || ethereum.is_null() {
                return None;
            }
            Some(Self { ethereum })
        }
        #[cfg(not(target_family = "wasm"))]
        {
            None
        }
    }
}

impl WalletProvider for BrowserWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        #[cfg(target_family = "wasm")]
        {
            wasm_impl::request(&self.ethereum, method, params).await
        }
        #[cfg(not(target_family = "wasm"))]
        {
            let _ = params;
            Err(ProviderError::new(
                4900,
                format!("{method}: browser wallet only available in WASM"),
            ))
        }
    }

    async fn pause(&self, interval: Duration) {
        #[cfg(target_family = "wasm")]
        gloo_timers::future::TimeoutFuture::new(interval.as_millis().min(u32::MAX as u128) as u32)
            .await;
        #[cfg(not(target_family = "wasm"))]
        let _ = interval;
    }

    fn provider_name(&self) -> &str {
        "metamask"
    }
}

// ─── WASM implementation ─────────────────────────────────────────────────────

#[cfg(target_family = "wasm")]
mod wasm_impl {
    use atm_common::error::ProviderError;
    use serde::Serialize;
    use serde_json::{json, Value};
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;

    const INTERNAL_ERROR: i64 = -32603;

    /// `ethereum.request({ method, params })`, awaited.
    pub async fn request(
        ethereum: &JsValue,
        method: &str,
        params: Value,
    ) -> Result<Value, ProviderError> {
        let args = json!({ "method": method, "params": params })
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| internal(format!("failed to encode {method} request: {e}")))?;

        let request_fn: js_sys::Function =
            js_sys::Reflect::get(ethereum, &JsValue::from_str("request"))
                .map_err(|e| internal(format!("ethereum.request missing: {e:?}")))?
                .dyn_into()
                .map_err(|_| internal("ethereum.request is not a function".into()))?;

        let promise: js_sys::Promise = request_fn
            .call1(ethereum, &args)
            .map_err(to_provider_error)?
            .dyn_into()
            .map_err(|_| internal("ethereum.request did not return a promise".into()))?;

        let result = JsFuture::from(promise).await.map_err(to_provider_error)?;
        serde_wasm_bindgen::from_value(result)
            .map_err(|e| internal(format!("failed to decode {method} response: {e}")))
    }

    fn internal(message: String) -> ProviderError {
        ProviderError::new(INTERNAL_ERROR, message)
    }

    /// Wallet rejections arrive as `{ code, message, data }` objects.
    fn to_provider_error(err: JsValue) -> ProviderError {
        if let Ok(parsed) = serde_wasm_bindgen::from_value::<ProviderError>(err.clone()) {
            return parsed;
        }
        let message = js_sys::Reflect::get(&err, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| format!("{err:?}"));
        web_sys::console::error_1(&err);
        internal(message)
    }
}
