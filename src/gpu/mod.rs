//! Headless wgpu compute backend.
//!
//! [`GpuSimulation`] runs the same update as the CPU
//! [`ParticleSystem`](crate::ParticleSystem): the kernels in
//! [`shader`](crate::shader) use the same hash, salts and noise, so a slot
//! follows the same path on either backend up to floating-point rounding.
//!
//! The particle buffers stay on the GPU. A renderer can bind them directly
//! through [`GpuSimulation::buffers`]; [`GpuSimulation::read_back`] copies them
//! into a [`ParticleStore`] for inspection.
//!
//! Unlike [`ParticleSystem::step`](crate::ParticleSystem::step), the GPU
//! step only advances position, velocity and life. It does not refresh
//! derived attributes: a renderer derives scale, color and alpha from the
//! `lives` buffer with the [`attributes`](crate::attributes) functions.

use std::sync::mpsc;

use glam::Vec3;
use log::debug;

use crate::emitter::EmitterState;
use crate::error::GpuError;
use crate::hash::FrameSalts;
use crate::params::SimParams;
use crate::shader::{init_shader, update_shader, WORKGROUP_SIZE};
use crate::store::ParticleStore;
use crate::uniforms::SimUniforms;

/// The three particle storage buffers.
///
/// Positions and velocities are `vec4<f32>` per slot (xyz used), lives are
/// one `f32` per slot.
pub struct ParticleBuffers {
    pub positions: wgpu::Buffer,
    pub velocities: wgpu::Buffer,
    pub lives: wgpu::Buffer,
}

impl ParticleBuffers {
    fn new(device: &wgpu::Device, count: u32) -> Self {
        // Zero-sized bindings are invalid; an empty swarm keeps one idle slot.
        let slots = count.max(1) as u64;
        let storage = |label: &str, size: u64, extra: wgpu::BufferUsages| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST
                    | extra,
                mapped_at_creation: false,
            })
        };
        Self {
            positions: storage("Position Buffer", slots * 16, wgpu::BufferUsages::VERTEX),
            velocities: storage("Velocity Buffer", slots * 16, wgpu::BufferUsages::empty()),
            lives: storage("Life Buffer", slots * 4, wgpu::BufferUsages::VERTEX),
        }
    }
}

/// A swarm simulated in compute shaders.
pub struct GpuSimulation {
    device: wgpu::Device,
    queue: wgpu::Queue,
    init_pipeline: wgpu::ComputePipeline,
    update_pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    buffers: ParticleBuffers,
    count: u32,
    seed: u32,
    frame: u32,
}

impl GpuSimulation {
    /// Acquire a device and create a swarm of `count` particles.
    ///
    /// Blocks until the adapter and device are ready.
    pub fn new(count: u32, seed: u32) -> Result<Self, GpuError> {
        pollster::block_on(Self::new_async(count, seed))
    }

    /// Async form of [`new`](Self::new).
    pub async fn new_async(count: u32, seed: u32) -> Result<Self, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        debug!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Embers Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        Ok(Self::with_device(device, queue, count, seed))
    }

    /// Create a swarm on an existing device, e.g. one shared with a
    /// renderer.
    pub fn with_device(device: wgpu::Device, queue: wgpu::Queue, count: u32, seed: u32) -> Self {
        let storage_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only: false },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Particle Bind Group Layout"),
            entries: &[
                storage_entry(0),
                storage_entry(1),
                storage_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Particle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |label: &str, source: String| {
            let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            });
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module: &module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            })
        };
        let init_pipeline = create_pipeline("Init Pipeline", init_shader());
        let update_pipeline = create_pipeline("Update Pipeline", update_shader());
        debug!("Created particle compute pipelines");

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<SimUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let buffers = ParticleBuffers::new(&device, count);
        let bind_group = create_bind_group(&device, &bind_group_layout, &buffers, &uniform_buffer);

        let sim = Self {
            device,
            queue,
            init_pipeline,
            update_pipeline,
            bind_group_layout,
            bind_group,
            uniform_buffer,
            buffers,
            count,
            seed,
            frame: 0,
        };
        sim.dispatch(&sim.init_pipeline, "Init Pass");
        debug!("Initialized {} GPU particles (seed {})", count, seed);
        sim
    }

    /// Destroy all buffers and rebuild them with `count` freshly
    /// initialized slots.
    pub fn resize(&mut self, count: u32) {
        self.buffers = ParticleBuffers::new(&self.device, count);
        self.bind_group = create_bind_group(
            &self.device,
            &self.bind_group_layout,
            &self.buffers,
            &self.uniform_buffer,
        );
        self.count = count;
        self.dispatch(&self.init_pipeline, "Init Pass");
        debug!("Resized GPU swarm to {} particles", count);
    }

    /// Advance every particle by one frame.
    pub fn step(&mut self, delta_time: f32, time: f32, emitter: &EmitterState, params: &SimParams) {
        let uniforms = SimUniforms::new(
            delta_time,
            time,
            emitter,
            params,
            FrameSalts::for_frame(self.seed, self.frame),
        );
        self.queue
            .write_buffer(&self.uniform_buffer, 0, uniforms.as_bytes());
        self.dispatch(&self.update_pipeline, "Update Pass");
        self.frame = self.frame.wrapping_add(1);
    }

    fn dispatch(&self, pipeline: &wgpu::ComputePipeline, label: &str) {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(pipeline);
            compute_pass.set_bind_group(0, &self.bind_group, &[]);

            let workgroups = self.count.max(1).div_ceil(WORKGROUP_SIZE);
            compute_pass.dispatch_workgroups(workgroups, 1, 1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Copy the particle buffers back to the CPU.
    ///
    /// Blocks until the GPU has finished all submitted work.
    pub fn read_back(&self) -> Result<ParticleStore, GpuError> {
        let count = self.count as usize;
        if count == 0 {
            return Ok(ParticleStore::default());
        }
        let copies = [
            (&self.buffers.positions, count as u64 * 16),
            (&self.buffers.velocities, count as u64 * 16),
            (&self.buffers.lives, count as u64 * 4),
        ];

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Readback Encoder"),
            });
        let staging: Vec<wgpu::Buffer> = copies
            .iter()
            .map(|&(source, size)| {
                let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Readback Staging"),
                    size,
                    usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                    mapped_at_creation: false,
                });
                encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
                staging
            })
            .collect();
        self.queue.submit(std::iter::once(encoder.finish()));

        let (tx, rx) = mpsc::channel();
        for (index, buffer) in staging.iter().enumerate() {
            let tx = tx.clone();
            buffer.slice(..).map_async(wgpu::MapMode::Read, move |result| {
                // Ignore send errors - receiver may have been dropped
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        self.device.poll(wgpu::Maintain::Wait);

        for _ in 0..staging.len() {
            let (_, result) = rx
                .recv()
                .map_err(|_| GpuError::BufferMapping("map callback never ran".into()))?;
            result?;
        }

        let read_vec4 = |buffer: &wgpu::Buffer| -> Vec<Vec3> {
            let data = buffer.slice(..).get_mapped_range();
            let values = bytemuck::cast_slice::<u8, [f32; 4]>(&data);
            values
                .iter()
                .take(count)
                .map(|v| Vec3::new(v[0], v[1], v[2]))
                .collect()
        };
        let positions = read_vec4(&staging[0]);
        let velocities = read_vec4(&staging[1]);
        let lives = {
            let data = staging[2].slice(..).get_mapped_range();
            let values = bytemuck::cast_slice::<u8, f32>(&data);
            values.iter().take(count).copied().collect::<Vec<f32>>()
        };
        for buffer in &staging {
            buffer.unmap();
        }

        ParticleStore::from_parts(positions, velocities, lives)
            .ok_or_else(|| GpuError::BufferMapping("buffer lengths differ".into()))
    }

    /// The particle storage buffers, for binding in a renderer.
    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Number of slots.
    pub fn len(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Index of the next frame to simulate.
    pub fn frame(&self) -> u32 {
        self.frame
    }
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffers: &ParticleBuffers,
    uniform_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Particle Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffers.positions.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: buffers.velocities.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: buffers.lives.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: uniform_buffer.as_entire_binding(),
            },
        ],
    })
}
