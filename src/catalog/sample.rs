//! Sample data served by the demo catalog

use super::schema::{
    relative_time, AccuracyPoint, ActivityKind, Challenge, CommunityEvent, Contributor,
    Difficulty, Discovery, GraphConnection, GraphNode, Impact, KnowledgeGraph, LearningSpeed,
    PerformanceMetrics, TrendingTopic, UserSatisfaction,
};
use chrono::{DateTime, Duration, Utc};

// ============================================================================
// Seed rows (loaded into the in-memory database)
// ============================================================================

pub struct SeedProject {
    pub title: &'static str,
    pub description: &'static str,
    pub difficulty: Difficulty,
    pub cost: f64,
    pub duration: &'static str,
    pub category: &'static str,
    pub tags: &'static [&'static str],
    pub rating: f64,
    pub views: i64,
    pub likes: i64,
    pub components: &'static [&'static str],
    pub skills: &'static [&'static str],
    pub code_content: &'static str,
    pub instructions: &'static str,
}

pub struct SeedActivity {
    pub kind: ActivityKind,
    pub description: &'static str,
    pub minutes_ago: i64,
}

pub struct SeedPost {
    pub user_name: &'static str,
    pub user_avatar: &'static str,
    pub content: &'static str,
    pub likes: i64,
    pub comments: i64,
    pub hours_ago: i64,
}

pub const SAMPLE_PROJECTS: &[SeedProject] = &[
    SeedProject {
        title: "Smart Home Security System",
        description: "Build an AI-powered security system with facial recognition and mobile \
alerts. This comprehensive project includes camera integration, motion detection, and real-time \
notifications.",
        difficulty: Difficulty::Intermediate,
        cost: 150.0,
        duration: "2-3 days",
        category: "Security",
        tags: &["AI", "IoT", "Security", "Raspberry Pi"],
        rating: 4.8,
        views: 1250,
        likes: 89,
        components: &[
            "Raspberry Pi 4",
            "Camera Module",
            "PIR Sensor",
            "Buzzer",
            "SD Card",
            "Power Supply",
        ],
        skills: &["Python", "OpenCV", "Electronics", "Linux"],
        code_content: r#"
# Smart Home Security System - Main Code
import cv2
import numpy as np
from datetime import datetime

class SecuritySystem:
    def __init__(self):
        self.camera = cv2.VideoCapture(0)
        self.face_cascade = cv2.CascadeClassifier(cv2.data.haarcascades + 'haarcascade_frontalface_default.xml')

    def detect_motion(self):
        ret, frame = self.camera.read()
        if ret:
            gray = cv2.cvtColor(frame, cv2.COLOR_BGR2GRAY)
            faces = self.face_cascade.detectMultiScale(gray, 1.1, 4)
            return len(faces) > 0
        return False

    def send_alert(self, message):
        print(f"ALERT: {message} at {datetime.now()}")

    def run(self):
        while True:
            if self.detect_motion():
                self.send_alert("Motion detected!")

if __name__ == "__main__":
    system = SecuritySystem()
    system.run()
"#,
        instructions: r"
Step 1: Hardware Setup
- Connect Raspberry Pi Camera Module to CSI port
- Connect PIR sensor to GPIO pin 18
- Connect buzzer to GPIO pin 12
- Ensure all connections are secure

Step 2: Software Installation
- Install OpenCV: pip install opencv-python
- Install required libraries: pip install numpy

Step 3: Configuration
- Enable camera interface in raspi-config
- Configure email settings for alerts
- Test camera functionality

Step 4: Deployment
- Run the main script
- Monitor system logs
- Set up automatic startup on boot
",
    },
    SeedProject {
        title: "Autonomous Flying Robot",
        description: "Create a self-navigating drone with obstacle avoidance and GPS tracking. \
Features advanced flight control algorithms and real-time path planning.",
        difficulty: Difficulty::Advanced,
        cost: 300.0,
        duration: "1 week",
        category: "Robotics",
        tags: &["Drone", "AI", "GPS", "Sensors", "Flight Control"],
        rating: 4.9,
        views: 2100,
        likes: 156,
        components: &[
            "Flight Controller",
            "GPS Module",
            "Ultrasonic Sensors",
            "Camera",
            "ESCs",
            "Motors",
            "Propellers",
            "Battery",
        ],
        skills: &["C++", "Flight Control", "Electronics", "PID Control"],
        code_content: r#"
// Autonomous Flying Robot - Flight Controller Code
#include <Servo.h>

class FlightController {
private:
    Servo motor1, motor2, motor3, motor4;
    float pitch, roll, yaw;

public:
    void initialize() {
        motor1.attach(3);
        motor2.attach(5);
        motor3.attach(6);
        motor4.attach(9);
        Serial.begin(9600);
        Serial.println(F("Flight Controller Initialized"));
    }

    void readSensors() {
        // Read IMU, GPS and ultrasonic sensors
    }

    void calculatePID() {
        float error_pitch = 0 - pitch;
        float error_roll = 0 - roll;
        // Apply PID corrections
    }

    void updateMotors() {
        motor1.writeMicroseconds(1500);
        motor2.writeMicroseconds(1500);
        motor3.writeMicroseconds(1500);
        motor4.writeMicroseconds(1500);
    }

    void autonomousNavigation() {
        // Obstacle avoidance, GPS waypoints, path planning
    }
};

FlightController drone;

void setup() {
    drone.initialize();
}

void loop() {
    drone.readSensors();
    drone.calculatePID();
    drone.updateMotors();
    drone.autonomousNavigation();
    delay(20);
}
"#,
        instructions: r"
Step 1: Frame Assembly
- Assemble quadcopter frame
- Mount flight controller in center
- Install motors and ESCs
- Balance propellers

Step 2: Electronics Integration
- Connect GPS module to UART
- Install ultrasonic sensors for obstacle detection
- Connect camera for FPV
- Wire power distribution

Step 3: Software Configuration
- Flash flight controller firmware
- Calibrate IMU and compass
- Configure GPS settings
- Test motor responses

Step 4: Flight Testing
- Start with manual control
- Test autonomous hover
- Implement waypoint navigation
- Add obstacle avoidance
",
    },
    SeedProject {
        title: "Voice-Controlled LED Matrix",
        description: "Build a smart LED display that responds to voice commands and shows \
animations. Perfect for beginners learning Arduino and voice recognition.",
        difficulty: Difficulty::Beginner,
        cost: 75.0,
        duration: "1 day",
        category: "Display",
        tags: &["Voice Control", "LED", "Arduino", "Audio", "Display"],
        rating: 4.6,
        views: 890,
        likes: 67,
        components: &[
            "Arduino Uno",
            "LED Matrix 8x8",
            "Microphone Module",
            "Speaker",
            "Jumper Wires",
            "Breadboard",
        ],
        skills: &["Arduino", "Basic Electronics", "C Programming"],
        code_content: r"
// Voice-Controlled LED Matrix
#include <LedControl.h>

LedControl lc = LedControl(12, 11, 10, 1);
int micPin = A0;
int threshold = 512;

byte heart[8] = {
  B00000000, B01100110, B11111111, B11111111,
  B01111110, B00111100, B00011000, B00000000
};

byte smile[8] = {
  B00111100, B01000010, B10100101, B10000001,
  B10100101, B10011001, B01000010, B00111100
};

void setup() {
  Serial.begin(9600);
  lc.shutdown(0, false);
  lc.setIntensity(0, 8);
  lc.clearDisplay(0);
}

void loop() {
  int soundLevel = analogRead(micPin);
  if (soundLevel > threshold) {
    displayPattern(soundLevel > 600 ? heart : smile);
    delay(2000);
    lc.clearDisplay(0);
  }
  delay(100);
}

void displayPattern(byte pattern[]) {
  for (int row = 0; row < 8; row++) {
    lc.setRow(0, row, pattern[row]);
  }
}
",
        instructions: r"
Step 1: Circuit Assembly
- Connect LED Matrix to Arduino (DIN=12, CS=10, CLK=11)
- Connect microphone module to analog pin A0
- Connect speaker to digital pin 8
- Add pull-up resistors as needed

Step 2: Library Installation
- Install LedControl library in Arduino IDE
- Verify all connections

Step 3: Code Upload
- Upload the provided code to Arduino
- Open Serial Monitor to see debug output
- Test microphone sensitivity

Step 4: Calibration
- Adjust threshold value for voice detection
- Add more patterns and animations
",
    },
];

pub const SAMPLE_ACTIVITIES: &[SeedActivity] = &[
    SeedActivity {
        kind: ActivityKind::Discovery,
        description: "Discovered new IoT sensor technology with 40% better accuracy",
        minutes_ago: 2,
    },
    SeedActivity {
        kind: ActivityKind::Merge,
        description: "Merged concepts: 'smart lighting' + 'motion detection'",
        minutes_ago: 5,
    },
    SeedActivity {
        kind: ActivityKind::Price,
        description: "Updated component prices from 3 suppliers",
        minutes_ago: 10,
    },
    SeedActivity {
        kind: ActivityKind::Feedback,
        description: "Learned from user feedback on drone project",
        minutes_ago: 15,
    },
    SeedActivity {
        kind: ActivityKind::Generation,
        description: "Generated new project: Smart Plant Watering System",
        minutes_ago: 20,
    },
    SeedActivity {
        kind: ActivityKind::Discovery,
        description: "Found 25% cheaper alternative for Arduino-compatible boards",
        minutes_ago: 25,
    },
    SeedActivity {
        kind: ActivityKind::Merge,
        description: "Successfully merged 'plant care' + 'AI vision' = Smart Garden Monitor",
        minutes_ago: 30,
    },
];

pub const SAMPLE_POSTS: &[SeedPost] = &[
    SeedPost {
        user_name: "Alex Chen",
        user_avatar: "AC",
        content: "Just completed the Smart Home Security System! The AI's component suggestions \
saved me $50. Here's my build process and some tips for anyone starting this project...",
        likes: 24,
        comments: 8,
        hours_ago: 2,
    },
    SeedPost {
        user_name: "Sarah Kim",
        user_avatar: "SK",
        content: "The AI suggested merging 'plant monitoring' with 'weather prediction' - resulted \
in an amazing automated greenhouse system! The concept merging feature is incredible.",
        likes: 31,
        comments: 12,
        hours_ago: 4,
    },
    SeedPost {
        user_name: "Mike Johnson",
        user_avatar: "MJ",
        content: "Thanks to the cost optimization feature, I built the flying robot for under \
$200. The AI found cheaper alternatives for every component! Sharing my parts list...",
        likes: 45,
        comments: 15,
        hours_ago: 6,
    },
    SeedPost {
        user_name: "Emma Davis",
        user_avatar: "ED",
        content: "The learning dashboard is fascinating! Watching the AI discover new technologies \
in real-time gives me so many project ideas. Just saw it merge 'solar power' + 'IoT sensors'.",
        likes: 18,
        comments: 6,
        hours_ago: 8,
    },
    SeedPost {
        user_name: "David Wilson",
        user_avatar: "DW",
        content: "Built my first Arduino project using the voice-controlled LED matrix guide. The \
step-by-step instructions were perfect for a beginner like me. Now planning something more \
advanced!",
        likes: 22,
        comments: 9,
        hours_ago: 12,
    },
];

// ============================================================================
// Static tables (served as-is)
// ============================================================================

pub fn discoveries(now: DateTime<Utc>) -> Vec<Discovery> {
    let rows: [(&str, &str, ActivityKind, Impact, i64); 5] = [
        (
            "New IoT Sensor",
            "Discovered advanced environmental sensor with 40% better accuracy",
            ActivityKind::Discovery,
            Impact::High,
            2,
        ),
        (
            "Cost Optimization",
            "Found 25% cheaper alternative for Arduino-compatible boards",
            ActivityKind::Price,
            Impact::Medium,
            4,
        ),
        (
            "Concept Merge",
            "Successfully merged 'plant care' + 'AI vision' = Smart Garden Monitor",
            ActivityKind::Merge,
            Impact::High,
            6,
        ),
        (
            "New Technology Trend",
            "Identified emerging trend in edge AI computing for IoT devices",
            ActivityKind::Discovery,
            Impact::High,
            8,
        ),
        (
            "Component Alternative",
            "Found compatible sensor with 30% lower power consumption",
            ActivityKind::Price,
            Impact::Medium,
            12,
        ),
    ];

    rows.into_iter()
        .map(|(title, description, kind, impact, hours_ago)| Discovery {
            title: title.to_string(),
            description: description.to_string(),
            kind,
            impact,
            time: relative_time(now, now - Duration::hours(hours_ago)),
        })
        .collect()
}

pub fn knowledge_graph() -> KnowledgeGraph {
    let nodes = [
        ("arduino", "Arduino", "hardware", 15),
        ("raspberry_pi", "Raspberry Pi", "hardware", 12),
        ("sensors", "Sensors", "components", 20),
        ("iot", "IoT", "concept", 18),
        ("ai", "Artificial Intelligence", "concept", 14),
        ("robotics", "Robotics", "field", 16),
        ("automation", "Home Automation", "application", 13),
    ];
    let connections = [
        ("arduino", "sensors", 0.9),
        ("raspberry_pi", "iot", 0.8),
        ("ai", "robotics", 0.7),
        ("sensors", "automation", 0.8),
        ("iot", "automation", 0.9),
    ];

    KnowledgeGraph {
        nodes: nodes
            .into_iter()
            .map(|(id, label, category, connections)| GraphNode {
                id: id.to_string(),
                label: label.to_string(),
                category: category.to_string(),
                connections,
            })
            .collect(),
        connections: connections
            .into_iter()
            .map(|(source, target, strength)| GraphConnection {
                source: source.to_string(),
                target: target.to_string(),
                strength,
            })
            .collect(),
    }
}

pub fn performance_metrics() -> PerformanceMetrics {
    let trend = [
        ("2024-01-01", 85.2),
        ("2024-01-02", 86.1),
        ("2024-01-03", 87.3),
        ("2024-01-04", 88.0),
        ("2024-01-05", 89.2),
        ("2024-01-06", 90.1),
        ("2024-01-07", 91.5),
    ];

    PerformanceMetrics {
        accuracy_trend: trend
            .into_iter()
            .map(|(date, accuracy)| AccuracyPoint {
                date: date.to_string(),
                accuracy,
            })
            .collect(),
        learning_speed: LearningSpeed {
            concepts_per_hour: 12.5,
            projects_analyzed_per_day: 45,
            price_updates_per_hour: 8.3,
        },
        user_satisfaction: UserSatisfaction {
            current_rating: 4.8,
            improvement_rate: 0.2,
            feedback_volume: 156,
        },
    }
}

pub fn top_contributors() -> Vec<Contributor> {
    [
        ("Alex Chen", "AC", 23, 45, 892, "Expert Maker"),
        ("Sarah Kim", "SK", 19, 38, 756, "AI Enthusiast"),
        ("Mike Johnson", "MJ", 17, 32, 689, "Robotics Pro"),
        ("Emma Davis", "ED", 15, 28, 612, "IoT Specialist"),
        ("David Wilson", "DW", 12, 24, 534, "Rising Star"),
    ]
    .into_iter()
    .map(
        |(name, avatar, projects, contributions, reputation, badge)| Contributor {
            name: name.to_string(),
            avatar: avatar.to_string(),
            projects,
            contributions,
            reputation,
            badge: badge.to_string(),
        },
    )
    .collect()
}

pub fn trending_topics() -> Vec<TrendingTopic> {
    [
        ("Smart Home Automation", 156, "+23%", "IoT"),
        ("AI-Powered Robotics", 134, "+18%", "Robotics"),
        ("Cost Optimization Tips", 98, "+15%", "Budget"),
        ("Arduino Projects", 89, "+12%", "Hardware"),
        ("Concept Merging Ideas", 76, "+28%", "Innovation"),
    ]
    .into_iter()
    .map(|(topic, posts, growth, category)| TrendingTopic {
        topic: topic.to_string(),
        posts,
        growth: growth.to_string(),
        category: category.to_string(),
    })
    .collect()
}

pub fn challenges() -> Vec<Challenge> {
    vec![
        Challenge {
            id: 1,
            title: "Build Under $50 Challenge".to_string(),
            description: "Create an innovative project using components under $50".to_string(),
            participants: 234,
            deadline: "2024-02-15".to_string(),
            prize: "Featured Project + $100 Gift Card".to_string(),
            difficulty: "All Levels".to_string(),
        },
        Challenge {
            id: 2,
            title: "AI Concept Merge Contest".to_string(),
            description: "Use our AI to merge two concepts into a unique project".to_string(),
            participants: 189,
            deadline: "2024-02-28".to_string(),
            prize: "AI Learning Credits + Recognition".to_string(),
            difficulty: "Intermediate".to_string(),
        },
        Challenge {
            id: 3,
            title: "Sustainable Tech Project".to_string(),
            description: "Build an eco-friendly project using renewable energy".to_string(),
            participants: 156,
            deadline: "2024-03-10".to_string(),
            prize: "Solar Panel Kit + Feature Article".to_string(),
            difficulty: "Advanced".to_string(),
        },
    ]
}

pub fn events() -> Vec<CommunityEvent> {
    vec![
        CommunityEvent {
            id: 1,
            title: "Virtual Maker Meetup".to_string(),
            description: "Monthly online gathering to share projects and ideas".to_string(),
            date: "2024-02-10".to_string(),
            time: "19:00 UTC".to_string(),
            attendees: 145,
            kind: "Virtual".to_string(),
        },
        CommunityEvent {
            id: 2,
            title: "AI Workshop: Advanced Concept Merging".to_string(),
            description: "Learn advanced techniques for creative project generation".to_string(),
            date: "2024-02-17".to_string(),
            time: "15:00 UTC".to_string(),
            attendees: 89,
            kind: "Workshop".to_string(),
        },
        CommunityEvent {
            id: 3,
            title: "Robotics Competition Prep".to_string(),
            description: "Prepare for the upcoming robotics challenge".to_string(),
            date: "2024-02-24".to_string(),
            time: "18:00 UTC".to_string(),
            attendees: 67,
            kind: "Competition".to_string(),
        },
    ]
}
