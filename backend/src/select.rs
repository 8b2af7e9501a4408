use crate::{BackendError, UinputPointer, XdotoolDriver};
use homerow::{BackendChoice, PointerDriver};
use tracing::{info, warn};

/// Opens the preferred pointer backend, falling back to the others in order.
pub fn open_pointer(preferred: BackendChoice) -> Result<Box<dyn PointerDriver>, BackendError> {
    let driver = first_available(preferred.preference(), |backend| match backend {
        BackendChoice::Uinput => UinputPointer::new().map(|d| Box::new(d) as Box<dyn PointerDriver>),
        BackendChoice::Xdotool => XdotoolDriver::new().map(|d| Box::new(d) as Box<dyn PointerDriver>),
    })?;

    if driver.name() != preferred.name() {
        info!(
            requested = preferred.name(),
            using = driver.name(),
            "Falling back to another pointer backend"
        );
    }
    Ok(driver)
}

fn first_available<T>(
    order: impl IntoIterator<Item = BackendChoice>,
    mut open: impl FnMut(BackendChoice) -> Result<T, BackendError>,
) -> Result<T, BackendError> {
    let mut tried = Vec::new();
    for backend in order {
        match open(backend) {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("{e}");
                tried.push(backend.name());
            },
        }
    }
    Err(BackendError::NoBackend {
        tried: tried.join(", "),
    })
}
