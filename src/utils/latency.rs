use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error as ActixError,
};
use futures::future::{ready, Ready};
use log::debug;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

// Middleware delaying every request by a fixed amount, the way a slow
// backend would
#[derive(Clone, Copy, Debug)]
pub struct SimulatedLatency {
    delay: Duration,
}

impl SimulatedLatency {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SimulatedLatency
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Transform = SimulatedLatencyService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SimulatedLatencyService {
            service: Rc::new(service),
            delay: self.delay,
        }))
    }
}

pub struct SimulatedLatencyService<S> {
    service: Rc<S>,
    delay: Duration,
}

impl<S, B> Service<ServiceRequest> for SimulatedLatencyService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let delay = self.delay;
        if delay.is_zero() {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            debug!("⏳ Delaying {} {} by {:?}", req.method(), req.path(), delay);
            actix_web::rt::time::sleep(delay).await;
            service.call(req).await
        })
    }
}
