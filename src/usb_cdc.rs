//! USB CDC-ACM host channel.

use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_usb::class::cdc_acm::{CdcAcmClass, Receiver, Sender, State};
use embassy_usb::driver::EndpointError;
use embassy_usb::Builder;
use trade_core::{CommandError, CommandSource, StatusError, StatusSink};

/// USB driver type used throughout the firmware.
pub type UsbDriver = Driver<'static, USB>;

/// Full-speed bulk packet size.
pub const CDC_PACKET_SIZE: u16 = 64;

/// Configure the CDC-ACM class in the USB builder.
pub fn configure_usb_cdc<'d>(
    builder: &mut Builder<'d, Driver<'d, USB>>,
    state: &'d mut State<'d>,
) -> CdcAcmClass<'d, Driver<'d, USB>> {
    CdcAcmClass::new(builder, state, CDC_PACKET_SIZE)
}

/// Split a CDC-ACM class into the host command source and status sink.
pub fn cdc_host<'d>(class: CdcAcmClass<'d, Driver<'d, USB>>) -> (CdcCommands<'d>, CdcStatus<'d>) {
    let (tx, rx) = class.split();
    (CdcCommands { rx }, CdcStatus { tx })
}

/// Host commands read from the CDC OUT endpoint.
pub struct CdcCommands<'d> {
    rx: Receiver<'d, Driver<'d, USB>>,
}

impl CommandSource for CdcCommands<'_> {
    async fn receive(&mut self, buf: &mut [u8]) -> Result<usize, CommandError> {
        // Returns at once while the port is open
        self.rx.wait_connection().await;
        self.rx.read_packet(buf).await.map_err(map_read_error)
    }

    fn is_connected(&self) -> bool {
        self.rx.dtr()
    }
}

/// Response text written to the CDC IN endpoint.
pub struct CdcStatus<'d> {
    tx: Sender<'d, Driver<'d, USB>>,
}

impl StatusSink for CdcStatus<'_> {
    async fn send(&mut self, text: &str) -> Result<(), StatusError> {
        let max = usize::from(self.tx.max_packet_size());
        let bytes = text.as_bytes();

        for chunk in bytes.chunks(max) {
            self.tx.write_packet(chunk).await.map_err(map_write_error)?;
        }

        // A full last packet needs a zero-length packet to end the transfer
        if !bytes.is_empty() && bytes.len() % max == 0 {
            self.tx.write_packet(&[]).await.map_err(map_write_error)?;
        }
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.tx.dtr()
    }
}

pub(crate) fn map_read_error(err: EndpointError) -> CommandError {
    match err {
        EndpointError::BufferOverflow => CommandError::BufferOverflow,
        EndpointError::Disabled => CommandError::Disconnected,
    }
}

pub(crate) fn map_write_error(err: EndpointError) -> StatusError {
    match err {
        EndpointError::Disabled => StatusError::NotReady,
        EndpointError::BufferOverflow => StatusError::Io,
    }
}
