//! Register bus task
//!
//! Services the I2C slave interface with the usual register-pointer
//! protocol: the first byte of every master write sets the register
//! pointer, any following bytes land in the bank starting there, and
//! reads stream bank bytes from the pointer onward.
//!
//! Master writes go through an encode/patch/decode round trip so the
//! byte image stays the single source of layout truth.

use defmt::*;
use embassy_rp::i2c_slave::{Command, I2cSlave};
use embassy_rp::peripherals::I2C0;

use diphros_protocol::{RegisterBank, REGISTER_BANK_SIZE};

use crate::channels::REGISTERS;

/// Bus task - services master transactions against the register bank
#[embassy_executor::task]
pub async fn bus_task(mut device: I2cSlave<'static, I2C0>) {
    info!("Bus task started");

    let mut pointer: usize = 0;
    // One pointer byte plus a full bank is the largest legal write.
    let mut buf = [0u8; REGISTER_BANK_SIZE + 1];

    loop {
        match device.listen(&mut buf).await {
            Ok(Command::Write(len)) => {
                handle_write(&mut pointer, &buf[..len]);
            }
            Ok(Command::WriteRead(len)) => {
                handle_write(&mut pointer, &buf[..len]);
                respond(&mut device, pointer).await;
            }
            Ok(Command::Read) => {
                respond(&mut device, pointer).await;
            }
            Ok(Command::GeneralCall(_)) => {}
            Err(e) => {
                warn!("Bus error: {:?}", e);
            }
        }
    }
}

/// Apply a master write: pointer byte first, then payload bytes
fn handle_write(pointer: &mut usize, data: &[u8]) {
    let Some((&addr, payload)) = data.split_first() else {
        return;
    };
    *pointer = addr as usize;
    if payload.is_empty() {
        return;
    }

    REGISTERS.lock(|regs| {
        let mut regs = regs.borrow_mut();
        let mut image = [0u8; REGISTER_BANK_SIZE];
        if regs.encode(&mut image).is_err() {
            return;
        }
        for (i, &byte) in payload.iter().enumerate() {
            let at = *pointer + i;
            if at < REGISTER_BANK_SIZE {
                image[at] = byte;
            }
        }
        if let Ok(decoded) = RegisterBank::decode(&image) {
            *regs = decoded;
        }
    });
}

/// Stream bank bytes from the pointer onward
async fn respond(device: &mut I2cSlave<'static, I2C0>, pointer: usize) {
    let mut image = [0u8; REGISTER_BANK_SIZE];
    REGISTERS.lock(|regs| {
        let _ = regs.borrow().encode(&mut image);
    });
    let start = pointer.min(REGISTER_BANK_SIZE);
    // Pad with zeros if the master clocks past the end of the bank.
    if let Err(e) = device.respond_and_fill(&image[start..], 0x00).await {
        warn!("Bus read response error: {:?}", e);
    }
}
