// src/os/serial.rs

//! Serial device opened in raw mode through `termios`.

use anyhow::{anyhow, bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use termios::{cfmakeraw, cfsetspeed, tcflush, tcsetattr, Termios, TCIFLUSH, TCSANOW, VMIN, VTIME};

use log::{debug, info, trace, warn};

use crate::config::{Parity, PortConfig, StopBits};
use crate::decoder::ByteSource;

/// Largest VTIME value, in deciseconds.
const MAX_VTIME_DECISECONDS: u64 = 255;

const BAUD_RATES: &[(u32, libc::speed_t)] = &[
    (50, libc::B50),
    (75, libc::B75),
    (110, libc::B110),
    (134, libc::B134),
    (150, libc::B150),
    (200, libc::B200),
    (300, libc::B300),
    (600, libc::B600),
    (1200, libc::B1200),
    (1800, libc::B1800),
    (2400, libc::B2400),
    (4800, libc::B4800),
    (9600, libc::B9600),
    (19200, libc::B19200),
    (38400, libc::B38400),
    (57600, libc::B57600),
    (115200, libc::B115200),
    (230400, libc::B230400),
    (460800, libc::B460800),
    (500000, libc::B500000),
    (576000, libc::B576000),
    (921600, libc::B921600),
    (1000000, libc::B1000000),
    (1152000, libc::B1152000),
    (1500000, libc::B1500000),
    (2000000, libc::B2000000),
    (2500000, libc::B2500000),
    (3000000, libc::B3000000),
    (3500000, libc::B3500000),
    (4000000, libc::B4000000),
];

/// Maps a numeric baud rate to its termios speed constant.
pub fn speed_for(baudrate: u32) -> Option<libc::speed_t> {
    BAUD_RATES
        .iter()
        .find(|(rate, _)| *rate == baudrate)
        .map(|(_, speed)| *speed)
}

/// An open serial device. Reads block for at most the configured timeout.
#[derive(Debug)]
pub struct SerialPort {
    path: PathBuf,
    file: Option<File>,
}

impl SerialPort {
    /// Opens `config.path` and applies the line settings.
    pub fn open(config: &PortConfig) -> Result<Self> {
        let path = config
            .path
            .clone()
            .ok_or_else(|| anyhow!("No serial port configured"))?;
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&path)
            .with_context(|| format!("Failed to open serial port {}", path.display()))?;
        configure(file.as_raw_fd(), config)
            .with_context(|| format!("Failed to configure serial port {}", path.display()))?;
        info!(
            "SerialPort: opened {} at {} baud ({} data bits, {:?} parity, {:?} stop bits)",
            path.display(),
            config.baudrate,
            config.bytesize,
            config.parity,
            config.stopbits
        );
        Ok(SerialPort {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn configure(fd: RawFd, config: &PortConfig) -> Result<()> {
    let mut tio = Termios::from_fd(fd).context("Failed to read terminal attributes")?;
    cfmakeraw(&mut tio);

    let speed = match speed_for(config.baudrate) {
        Some(speed) => speed,
        None => bail!("Unsupported baud rate {}", config.baudrate),
    };
    cfsetspeed(&mut tio, speed as termios::speed_t).context("Failed to set baud rate")?;

    tio.c_cflag |= (libc::CREAD | libc::CLOCAL) as termios::tcflag_t;

    let size_flag = match config.bytesize {
        5 => libc::CS5,
        6 => libc::CS6,
        7 => libc::CS7,
        8 => libc::CS8,
        other => bail!("Invalid byte size {}", other),
    };
    tio.c_cflag &= !(libc::CSIZE as termios::tcflag_t);
    tio.c_cflag |= size_flag as termios::tcflag_t;

    tio.c_cflag &= !((libc::PARENB | libc::PARODD | libc::CMSPAR) as termios::tcflag_t);
    tio.c_iflag &= !((libc::INPCK | libc::ISTRIP) as termios::tcflag_t);
    let parity_flags = match config.parity {
        Parity::None => 0,
        Parity::Even => libc::PARENB,
        Parity::Odd => libc::PARENB | libc::PARODD,
        Parity::Space => libc::PARENB | libc::CMSPAR,
        Parity::Mark => libc::PARENB | libc::CMSPAR | libc::PARODD,
    };
    tio.c_cflag |= parity_flags as termios::tcflag_t;
    if config.parity != Parity::None {
        tio.c_iflag |= libc::INPCK as termios::tcflag_t;
    }

    match config.stopbits {
        StopBits::One => tio.c_cflag &= !(libc::CSTOPB as termios::tcflag_t),
        StopBits::OnePointFive => {
            // termios has no 1.5 stop bits.
            warn!("SerialPort: 1.5 stop bits not supported by termios, using 2");
            tio.c_cflag |= libc::CSTOPB as termios::tcflag_t;
        }
        StopBits::Two => tio.c_cflag |= libc::CSTOPB as termios::tcflag_t,
    }

    let sw_flags = (libc::IXON | libc::IXOFF | libc::IXANY) as termios::tcflag_t;
    if config.swflowctl {
        tio.c_iflag |= (libc::IXON | libc::IXOFF) as termios::tcflag_t;
    } else {
        tio.c_iflag &= !sw_flags;
    }
    if config.rtscts {
        tio.c_cflag |= libc::CRTSCTS as termios::tcflag_t;
    } else {
        tio.c_cflag &= !(libc::CRTSCTS as termios::tcflag_t);
    }
    if config.dsrdtr {
        warn!("SerialPort: DSR/DTR flow control is not available through termios; ignoring");
    }

    let deciseconds = config
        .timeout_secs
        .saturating_mul(10)
        .min(MAX_VTIME_DECISECONDS);
    tio.c_cc[VMIN] = 0;
    tio.c_cc[VTIME] = deciseconds as termios::cc_t;

    tcsetattr(fd, TCSANOW, &tio).context("Failed to apply terminal attributes")?;
    tcflush(fd, TCIFLUSH).context("Failed to flush input queue")?;
    debug!(
        "SerialPort: fd {} configured, read timeout {} ds",
        fd, deciseconds
    );
    Ok(())
}

impl ByteSource for SerialPort {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "serial port closed"))?;
        let mut byte = [0u8; 1];
        match file.read(&mut byte) {
            Ok(0) => {
                trace!("SerialPort: read timed out");
                Ok(None)
            }
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                trace!("SerialPort: read interrupted by signal");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) -> bool {
        match self.file.take() {
            Some(file) => {
                drop(file);
                debug!("SerialPort: closed {}", self.path.display());
                true
            }
            None => false,
        }
    }
}
